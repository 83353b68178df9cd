/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`: Interactive chatbot
- `recommend`: Personalized recommendation for one location
- `map`: Congestion map browser
- `prefs`: Show or change the stored preferences

Handlers build the HTTP client and the user context from configuration and
hand them to the view types; the views never touch configuration.
*/

use crate::api::{CultureApi, HttpApiClient};
use crate::config::Config;
use crate::error::{GuideError, Result};
use crate::preferences::{PreferenceStore, UserContext};
use crate::storage::LocalStorage;

// Special commands parser for the chat session
pub mod special_commands;

/// Open the preference store selected by configuration and load the context
pub fn open_context(config: &Config) -> Result<UserContext> {
    let storage = match &config.storage.path {
        Some(path) => LocalStorage::new_with_path(path)?,
        None => LocalStorage::new()?,
    };
    Ok(UserContext::load(PreferenceStore::open(storage)))
}

/// Build the service client from configuration
pub fn build_client(config: &Config) -> Result<HttpApiClient> {
    HttpApiClient::new(&config.api)
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Runs a readline loop: special commands are handled locally, everything
    //! else is submitted to the chatbot and new messages are printed as they
    //! arrive.

    use super::*;
    use crate::chat::{ChatMessage, ChatSession, InputBuffer, Role};
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::congestion_map::CongestionMapView;
    use crate::formatter::format_markdown;
    use crate::recommendation::RecommendationView;
    use crate::render::render_inlines;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    const PROMPT: &str = "you >> ";
    /// Continuation lines line up under the text after the `bot >> ` label
    const MESSAGE_INDENT: &str = "       ";

    /// Start the interactive chat
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    ///
    /// # Errors
    ///
    /// Returns error if the client, the preference store, or the line editor
    /// cannot be initialized
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat");

        let api = build_client(&config)?;
        let mut context = open_context(&config)?;
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&context);

        let mut session = ChatSession::start(&mut context);
        print_unseen(&mut session);

        let mut input = InputBuffer::new(config.chat.max_input_lines);

        loop {
            let prompt = input.prompt(PROMPT);
            match rl.readline(&prompt) {
                Ok(line) => {
                    if !input.is_continuing() {
                        if line.trim().is_empty() {
                            continue;
                        }
                        if !line.trim_end().ends_with('\\') {
                            match parse_special_command(&line) {
                                Ok(SpecialCommand::None) => {}
                                Ok(SpecialCommand::Exit) => break,
                                Ok(command) => {
                                    let _ = rl.add_history_entry(line.trim());
                                    handle_special_command(command, &api, &mut context).await;
                                    continue;
                                }
                                Err(e) => {
                                    eprintln!("{}\n", e.to_string().red());
                                    continue;
                                }
                            }
                        }
                    }

                    let Some(message) = input.push_line(line.trim_end()) else {
                        continue;
                    };
                    let _ = rl.add_history_entry(message.as_str());

                    println!("{}", "답변을 기다리는 중...".dimmed());
                    session.submit(&api, &context, &message).await;
                    print_unseen(&mut session);
                }
                Err(ReadlineError::Interrupted) => {
                    if input.is_continuing() {
                        input.clear();
                        continue;
                    }
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn handle_special_command(
        command: SpecialCommand,
        api: &dyn CultureApi,
        context: &mut UserContext,
    ) {
        match command {
            SpecialCommand::Help => print_help(),
            SpecialCommand::ShowPrefs => {
                println!("\n{}", super::prefs::render_preferences(context.preferences()));
            }
            SpecialCommand::SetPreference(patch) => match context.update(&patch) {
                Ok(updated) => {
                    println!("{}", "✓ 설정이 저장되었습니다".green());
                    println!("{}", super::prefs::render_preferences(updated));
                }
                Err(e) => eprintln!("{}\n", format!("Error: {:#}", e).red()),
            },
            SpecialCommand::Recommend(location) => {
                println!("{}", "추천 정보를 불러오는 중입니다...".dimmed());
                let mut view = RecommendationView::new();
                view.search(api, context, &location).await;
                super::recommend::print_state(view.state());
            }
            SpecialCommand::Map(area) => {
                let mut view = CongestionMapView::load(api).await;
                if let Some(query) = area {
                    super::map::select_by_query(&mut view, api, &query).await;
                }
                println!("{}", crate::render::map::render_view(&view));
            }
            SpecialCommand::Clear => print!("\x1B[2J\x1B[1;1H"),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
    }

    /// Print messages appended since the last call; the user's own lines
    /// were already echoed by the editor
    fn print_unseen(session: &mut ChatSession) {
        for message in session.drain_unseen() {
            if message.role == Role::Assistant {
                println!("{}", format_message(message));
            }
        }
    }

    /// Assistant replies are markdown; user lines are shown as typed
    fn format_message(message: &ChatMessage) -> String {
        match message.role {
            Role::Assistant => format!(
                "\n{} >> {}\n",
                "bot".cyan().bold(),
                render_inlines(&format_markdown(&message.content), MESSAGE_INDENT)
            ),
            Role::User => format!(
                "\n{} >> {}\n",
                "you".green().bold(),
                message.content
            ),
        }
    }

    /// Display welcome banner at the start of the chat
    fn print_welcome_banner(context: &UserContext) {
        let prefs = context.preferences();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║             스마트문화예술 Culture Guide - Chat              ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!(
            "Preferences: {} / {} / 자녀 {} / {}",
            prefs.gender.to_string().cyan(),
            prefs.age_group.to_string().cyan(),
            prefs.has_children.to_string().cyan(),
            prefs.transportation.to_string().cyan()
        );
        println!("Type '/help' for available commands, 'exit' to quit");
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::chat::{ONBOARDING_MESSAGE, WELCOME_MESSAGE};

        #[test]
        fn test_format_message_labels_role() {
            colored::control::set_override(false);
            let out = format_message(&ChatMessage::assistant(WELCOME_MESSAGE));
            assert!(out.contains("bot"));
            assert!(out.contains(WELCOME_MESSAGE));
        }

        #[test]
        fn test_assistant_markdown_is_rendered() {
            colored::control::set_override(false);
            let out = format_message(&ChatMessage::assistant(ONBOARDING_MESSAGE));
            assert!(out.contains("💡 사용 안내"));
            assert!(out.contains("• 사용자 설정(/set, /prefs)"));
            assert!(!out.contains("###"));
            assert!(!out.contains("**"));
            assert!(!out.contains('`'));
        }

        #[test]
        fn test_bold_reply_has_no_markers() {
            colored::control::set_override(false);
            let reply = "**강남역** 주변에는\n**재즈 공연**이 있습니다.";
            let out = format_message(&ChatMessage::assistant(reply));
            assert!(out.contains("강남역 주변에는\n       재즈 공연이 있습니다."));
            assert!(!out.contains("**"));
        }

        #[tokio::test]
        async fn test_set_preference_command_updates_context() {
            let dir = crate::test_utils::temp_dir();
            let mut context = crate::test_utils::temp_context(&dir);
            let api = crate::test_utils::FakeApi::new();

            let command = parse_special_command("/set has_children 예").unwrap();
            handle_special_command(command, &api, &mut context).await;

            assert_eq!(
                context.preferences().has_children,
                crate::preferences::HasChildren::Yes
            );
        }

        #[tokio::test]
        async fn test_recommend_command_calls_service_once() {
            let dir = crate::test_utils::temp_dir();
            let mut context = crate::test_utils::temp_context(&dir);
            let api = crate::test_utils::FakeApi::new();

            handle_special_command(
                SpecialCommand::Recommend("명동".to_string()),
                &api,
                &mut context,
            )
            .await;
            assert_eq!(api.calls().recommend, 1);
        }
    }
}

// Recommendation command handler
pub mod recommend {
    use super::*;
    use crate::recommendation::{RecommendationView, ViewState};
    use colored::Colorize;

    /// Search a recommendation and print it
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `location` - Free-text location, joined from the CLI words
    /// * `json` - Print the raw payload instead of the rendered panel
    ///
    /// # Errors
    ///
    /// Returns error when the search fails or the location is blank
    pub async fn run_recommend(config: Config, location: String, json: bool) -> Result<()> {
        let api = build_client(&config)?;
        let context = open_context(&config)?;

        let mut view = RecommendationView::new();
        match view.search(&api, &context, &location).await {
            ViewState::Loaded(result) if json => {
                println!("{}", serde_json::to_string_pretty(result)?);
                Ok(())
            }
            ViewState::Loaded(result) => {
                println!("{}", crate::render::recommendation::render(result));
                Ok(())
            }
            ViewState::Error(message) => Err(GuideError::Validation(message.clone()).into()),
            ViewState::Idle | ViewState::Loading => Ok(()),
        }
    }

    /// Print whatever the view holds
    pub fn print_state(state: &ViewState) {
        match state {
            ViewState::Loaded(result) => {
                println!("{}", crate::render::recommendation::render(result))
            }
            ViewState::Error(message) => eprintln!("{}\n", message.red()),
            ViewState::Loading => println!("{}", "추천 정보를 불러오는 중입니다...".dimmed()),
            ViewState::Idle => println!(
                "{}",
                "위치를 검색하여 맞춤 문화예술 활동을 추천받아보세요. (예: 홍대, 강남, 명동, 북촌, 이태원, 여의도)"
                    .dimmed()
            ),
        }
    }
}

// Congestion map command handler
pub mod map {
    use super::*;
    use crate::congestion_map::{CongestionMapView, Selection};
    use crate::render::map::render_view;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Browse the congestion map
    ///
    /// With `area`, prints that area's detail and exits; otherwise opens an
    /// interactive browser where entering a list number or area name toggles
    /// its detail.
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be built, the list cannot be
    /// fetched in non-interactive mode, or the requested area is unknown
    pub async fn run_map(config: Config, area: Option<String>, json: bool) -> Result<()> {
        let api = build_client(&config)?;

        if json {
            return print_json(&api, area.as_deref()).await;
        }

        let mut view = CongestionMapView::load(&api).await;

        if let Some(query) = area {
            if let Some(error) = view.list_error() {
                return Err(GuideError::Validation(error.to_string()).into());
            }
            return match select_by_query(&mut view, &api, &query).await {
                Some(Selection::Selected) => {
                    if let Some(detail) = view.detail() {
                        println!("{}", crate::render::map::render_area_detail(detail));
                    }
                    Ok(())
                }
                Some(_) => Err(GuideError::Validation(format!(
                    "{} {}",
                    query,
                    crate::render::map::DETAIL_FAILED
                ))
                .into()),
                None => Err(GuideError::Validation(format!("Unknown area: {}", query)).into()),
            };
        }

        browse(&api, view).await
    }

    async fn print_json(api: &dyn CultureApi, area: Option<&str>) -> Result<()> {
        let json = match area {
            Some(area) => serde_json::to_string_pretty(&api.get_area_congestion(area).await?)?,
            None => serde_json::to_string_pretty(&api.get_congestion_areas().await?)?,
        };
        println!("{}", json);
        Ok(())
    }

    /// Resolve `query` against the list (falling back to the raw name) and
    /// toggle that area
    pub async fn select_by_query(
        view: &mut CongestionMapView,
        api: &dyn CultureApi,
        query: &str,
    ) -> Option<Selection> {
        let name = match view.find_area(query) {
            Some(area) => area.area.clone(),
            None if view.areas().is_empty() && !query.trim().is_empty() => query.trim().to_string(),
            None => return None,
        };
        Some(view.select(api, &name).await)
    }

    async fn browse(api: &dyn CultureApi, mut view: CongestionMapView) -> Result<()> {
        println!("{}", render_view(&view));
        if view.list_error().is_some() {
            return Ok(());
        }

        let mut rl = DefaultEditor::new()?;
        loop {
            match rl.readline("지역 번호 또는 이름 (q: 종료) >> ") {
                Ok(line) => {
                    let query = line.trim();
                    if query.is_empty() {
                        continue;
                    }
                    if matches!(query, "q" | "quit" | "exit") {
                        break;
                    }
                    let _ = rl.add_history_entry(query);
                    match select_by_query(&mut view, api, query).await {
                        Some(_) => println!("{}", render_view(&view)),
                        None => println!("{}", format!("'{}' 지역을 찾을 수 없습니다.", query).yellow()),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }
        Ok(())
    }

}

// Preference command handler
pub mod prefs {
    use super::*;
    use crate::cli::{PrefsCommand, PrefsSetArgs};
    use crate::preferences::{
        AgeGroup, Gender, HasChildren, PreferencesPatch, Transportation, UserPreferences,
    };
    use colored::Colorize;
    use prettytable::{format, row, Table};

    /// Run a `prefs` subcommand
    ///
    /// # Errors
    ///
    /// Returns error if a value is invalid, nothing was given to `set`, or
    /// the store cannot be written
    pub fn run_prefs(config: Config, command: PrefsCommand) -> Result<()> {
        let mut context = open_context(&config)?;

        match command {
            PrefsCommand::Show { json } => {
                if json {
                    println!("{}", serde_json::to_string_pretty(context.preferences())?);
                } else {
                    println!("{}", render_preferences(context.preferences()));
                }
            }
            PrefsCommand::Set(args) => {
                let patch = patch_from_args(&args)?;
                let updated = context.update(&patch)?;
                println!("{}", "✓ 설정이 저장되었습니다".green());
                println!("{}", render_preferences(updated));
            }
            PrefsCommand::Reset => {
                let defaults = context.reset()?;
                println!("{}", "✓ 기본 설정으로 되돌렸습니다".green());
                println!("{}", render_preferences(defaults));
            }
        }

        Ok(())
    }

    /// Parse the CLI fields into a patch
    pub fn patch_from_args(args: &PrefsSetArgs) -> Result<PreferencesPatch> {
        if args.is_empty() {
            return Err(GuideError::Validation(
                "Nothing to change. Use --gender, --age-group, --has-children or --transportation"
                    .to_string(),
            )
            .into());
        }

        Ok(PreferencesPatch {
            gender: args.gender.as_deref().map(str::parse::<Gender>).transpose()?,
            age_group: args.age_group.as_deref().map(str::parse::<AgeGroup>).transpose()?,
            has_children: args.has_children.as_deref().map(str::parse::<HasChildren>).transpose()?,
            transportation: args.transportation.as_deref().map(str::parse::<Transportation>).transpose()?,
        })
    }

    /// Preference table
    pub fn render_preferences(prefs: &UserPreferences) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
        table.add_row(row!["성별".bold(), prefs.gender]);
        table.add_row(row!["연령대".bold(), prefs.age_group]);
        table.add_row(row!["자녀 유무".bold(), prefs.has_children]);
        table.add_row(row!["이동 수단".bold(), prefs.transportation]);
        table.to_string()
    }

}
