use tracing::info;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.variant == ToastVariant::Destructive
    }
}

/// Fire-and-forget user notifications.
pub trait Toaster {
    fn toast(&mut self, toast: Toast);
}

/// Keeps every toast it is handed, newest last.
#[derive(Debug, Default)]
pub struct ToastLog {
    toasts: Vec<Toast>,
}

impl ToastLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn last(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    pub fn failures(&self) -> usize {
        self.toasts.iter().filter(|toast| toast.is_failure()).count()
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }
}

impl Toaster for ToastLog {
    fn toast(&mut self, toast: Toast) {
        info!(title = %toast.title, variant = ?toast.variant, "toast");
        self.toasts.push(toast);
    }
}
