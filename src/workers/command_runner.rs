use std::sync::Arc;
use std::time::Instant;
use crate::config::config_manager::ConfigManager;
use crate::enums::approval_status::ApprovalStatus;
use crate::enums::commands::Commands;
use crate::enums::export_format::ExportFormat;
use crate::enums::priority::Priority;
use crate::errors::{ClientError, ClientResult};
use crate::logger::report_printer::ReportPrinter;
use crate::structs::config::config::Config;
use crate::structs::queue_filter::QueueFilter;
use crate::ui::console_surface::ConsoleSurface;
use crate::workers::client_context::ClientContext;

pub struct CommandRunner {
    start_time: Option<Instant>,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self { start_time: None }
    }

    pub async fn run_command(&mut self, command: Commands) -> ClientResult<()> {
        self.start_time = Some(Instant::now());

        let result = match command {
            Commands::Init => Self::init_command(),
            Commands::ValidateConfig => Self::validate_config_command(),
            Commands::Status => Self::status_command().await,
            Commands::Queue { priority, filter } => Self::queue_command(priority, filter).await,
            Commands::Approve { id } => Self::approve_command(&id).await,
            Commands::Reject { id, reason } => Self::reject_command(&id, reason.as_deref()).await,
            Commands::ApproveAll { yes } => Self::approve_all_command(yes).await,
            Commands::RejectAll { yes, reason } => Self::reject_all_command(yes, reason.as_deref()).await,
            Commands::History { status, pages } => Self::history_command(status, pages).await,
            Commands::Search { query } => Self::search_command(&query).await,
            Commands::Export { format, output } => Self::export_command(format, output).await,
            Commands::LineHistory { file, line } => Self::line_history_command(&file, line).await,
            Commands::ValidateFile { file } => Self::validate_file_command(&file).await,
            Commands::Watch => Self::watch_command().await,
        };

        if let Some(start) = self.start_time {
            log::debug!("⏱️  Command completed in {:.2}s", start.elapsed().as_secs_f64());
        }

        result
    }

    fn init_command() -> ClientResult<()> {
        log::info!("🚀 Initializing approval-client configuration...");
        let path = ConfigManager::init()?;
        log::info!("📝 Edit {} to point at your Engine.", path.display());
        log::info!("🔧 Run 'approval-client validate-config' to check it.");
        Ok(())
    }

    fn validate_config_command() -> ClientResult<()> {
        let config = ConfigManager::load()?;
        match ConfigManager::validate(&config) {
            Ok(()) => {
                log::info!("✅ Configuration is valid");
                Ok(())
            }
            Err(errors) => {
                for error in &errors {
                    log::error!("❌ {}", error);
                }
                Err(ClientError::config_error(
                    &format!("{} problem(s) found", errors.len()),
                    None,
                    Some("Fix the listed fields and run validate-config again"),
                ))
            }
        }
    }

    fn load_config() -> ClientResult<Config> {
        let config = ConfigManager::load()?;
        if let Err(errors) = ConfigManager::validate(&config) {
            return Err(ClientError::config_error(
                &errors.join("; "),
                None,
                Some("Run 'approval-client validate-config' for details"),
            ));
        }
        Ok(config)
    }

    /// Connected context for one-shot commands. The push channel is left off;
    /// these commands only need request/response calls.
    async fn connected_context(assume_yes: bool) -> ClientResult<Arc<ClientContext>> {
        let mut config = Self::load_config()?;
        config.real_time_updates = false;
        let surface = Arc::new(ConsoleSurface::new(assume_yes));
        let context = ClientContext::from_config(config, surface.clone(), surface)?;
        context.transport.connect().await?;
        Ok(context)
    }

    async fn status_command() -> ClientResult<()> {
        let config = Self::load_config()?;
        let surface = Arc::new(ConsoleSurface::new(false));
        let context = ClientContext::from_config(config.clone(), surface.clone(), surface)?;
        let health = context.transport.health().await;
        if let Err(e) = &health {
            log::warn!("⚠️ {}", e.user_message());
        }
        ReportPrinter::print_status(&config.engine_url, context.transport.status(), health.as_ref().ok());
        Ok(())
    }

    async fn queue_command(priority: Option<String>, filter: Option<String>) -> ClientResult<()> {
        let priority = match priority.as_deref() {
            Some(value) => Some(Priority::parse(value).ok_or_else(|| {
                ClientError::validation("priority", &format!("'{}' is not one of low, medium, high", value))
            })?),
            None => None,
        };

        let context = Self::connected_context(false).await?;
        context.queue.refresh().await?;
        context.queue.set_filter(QueueFilter { priority, text: filter });
        ReportPrinter::print_queue(&context.queue.group_by_priority());
        Ok(())
    }

    async fn approve_command(id: &str) -> ClientResult<()> {
        let context = Self::connected_context(false).await?;
        let response = context.queue.approve(id).await?;
        log::info!("✅ {} is now {}", response.request_id, response.status);
        Ok(())
    }

    async fn reject_command(id: &str, reason: Option<&str>) -> ClientResult<()> {
        let context = Self::connected_context(false).await?;
        let response = context.queue.reject(id, reason).await?;
        log::info!("❌ {} is now {}", response.request_id, response.status);
        Ok(())
    }

    async fn approve_all_command(yes: bool) -> ClientResult<()> {
        let context = Self::connected_context(yes).await?;
        context.queue.refresh().await?;
        let outcome = context.queue.approve_all().await?;
        ReportPrinter::print_bulk(&outcome, "Approved");
        Ok(())
    }

    async fn reject_all_command(yes: bool, reason: Option<&str>) -> ClientResult<()> {
        let context = Self::connected_context(yes).await?;
        context.queue.refresh().await?;
        let outcome = context.queue.reject_all(reason).await?;
        ReportPrinter::print_bulk(&outcome, "Rejected");
        Ok(())
    }

    async fn history_command(status: Option<String>, pages: u32) -> ClientResult<()> {
        let status = match status.as_deref() {
            Some(value) => Some(ApprovalStatus::parse(value).ok_or_else(|| {
                ClientError::validation("status", &format!("'{}' is not a known approval status", value))
            })?),
            None => None,
        };

        let context = Self::connected_context(false).await?;
        context.history.set_status_filter(status).await?;
        for _ in 1..pages.max(1) {
            if context.history.load_more().await? == 0 {
                break;
            }
        }
        ReportPrinter::print_history(&context.history.groups(), context.history.has_more());
        Ok(())
    }

    async fn search_command(query: &str) -> ClientResult<()> {
        let context = Self::connected_context(false).await?;
        context.history.search(query).await?;
        ReportPrinter::print_history(&context.history.groups(), context.history.has_more());
        Ok(())
    }

    async fn export_command(format: ExportFormat, output: Option<String>) -> ClientResult<()> {
        let context = Self::connected_context(false).await?;
        context.history.refresh().await?;
        while context.history.load_more().await? > 0 {}
        let text = context.history.export(format)?;

        match output {
            Some(path) => {
                tokio::fs::write(&path, text).await?;
                log::info!("💾 Exported {} entries to {}", context.history.len(), path);
            }
            None => println!("{}", text),
        }
        Ok(())
    }

    async fn line_history_command(file: &str, line: usize) -> ClientResult<()> {
        let context = Self::connected_context(false).await?;
        let entries = context.transport.line_history(file, line).await?;
        ReportPrinter::print_line_history(file, line, &entries);
        Ok(())
    }

    async fn validate_file_command(file: &str) -> ClientResult<()> {
        let content = tokio::fs::read_to_string(file).await?;
        let context = Self::connected_context(false).await?;
        let report = context.validate_file(file, Some(&content)).await?;
        ReportPrinter::print_validation(&report);
        Ok(())
    }

    /// Long-running mode: push channel, timers and notifications until Ctrl-C.
    async fn watch_command() -> ClientResult<()> {
        let mut config = Self::load_config()?;
        config.auto_connect = true;
        let surface = Arc::new(ConsoleSurface::new(false));
        let context = ClientContext::from_config(config, surface.clone(), surface)?;

        log::info!("👀 Watching {} (Ctrl-C to stop)", context.transport.engine_url());
        context.start().await;

        tokio::signal::ctrl_c().await?;
        context.dispose();
        Ok(())
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}
