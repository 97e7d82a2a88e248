use std::collections::HashMap;
use std::io::{self, Write};
use async_trait::async_trait;
use parking_lot::Mutex;
use crate::enums::notification_type::NotificationType;
use crate::structs::line_decoration::LineDecoration;
use crate::structs::notification_record::NotificationRecord;
use crate::traits::editor_surface::EditorSurface;
use crate::traits::user_prompt::UserPrompt;

/// Terminal stand-in for an editor host.
///
/// Annotations are printed and remembered per file; confirmations read a
/// y/N answer from stdin unless `assume_yes` is set.
pub struct ConsoleSurface {
    assume_yes: bool,
    active_file: Option<String>,
    annotations: Mutex<HashMap<String, Vec<LineDecoration>>>,
}

impl ConsoleSurface {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            active_file: None,
            annotations: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_active_file(mut self, file_path: &str) -> Self {
        self.active_file = Some(file_path.to_string());
        self
    }

    pub fn annotations(&self, file_path: &str) -> Vec<LineDecoration> {
        self.annotations.lock().get(file_path).cloned().unwrap_or_default()
    }

    fn icon(notification_type: NotificationType) -> &'static str {
        match notification_type {
            NotificationType::ApprovalRequest => "🔔",
            NotificationType::ApprovalResolved => "📬",
            NotificationType::ConnectionStatus => "🔌",
            NotificationType::Info => "ℹ️",
            NotificationType::Warning => "⚠️",
            NotificationType::Error => "❌",
        }
    }
}

impl EditorSurface for ConsoleSurface {
    fn active_file(&self) -> Option<String> {
        self.active_file.clone()
    }

    fn apply_annotations(&self, file_path: &str, decorations: &[LineDecoration]) {
        println!("🖍️  {}", file_path);
        for decoration in decorations {
            let label = decoration.inline_label.as_deref().unwrap_or(&decoration.style_class);
            println!("   {:>5} │ {}", decoration.line, label);
        }
        self.annotations.lock().insert(file_path.to_string(), decorations.to_vec());
    }

    fn clear_annotations(&self, file_path: &str) {
        if self.annotations.lock().remove(file_path).is_some() {
            println!("🧽 Cleared annotations for {}", file_path);
        }
    }
}

#[async_trait]
impl UserPrompt for ConsoleSurface {
    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("❓ {} [y/N]: ", message);
        if io::stdout().flush().is_err() {
            return false;
        }
        let answer = tokio::task::spawn_blocking(|| {
            let mut input = String::new();
            io::stdin().read_line(&mut input).map(|_| input)
        })
        .await;

        match answer {
            Ok(Ok(input)) => matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }

    /// Prints the notification. Actions are listed but not selectable here;
    /// the matching CLI commands do the same thing.
    async fn present(&self, notification: &NotificationRecord) -> Option<String> {
        println!(
            "{} {}\n   {}",
            Self::icon(notification.notification_type),
            notification.title,
            notification.message
        );
        if !notification.actions.is_empty() {
            let titles: Vec<&str> = notification.actions.iter().map(|a| a.title.as_str()).collect();
            println!("   ↳ {}", titles.join(" · "));
        }
        None
    }
}
