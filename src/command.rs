use std::fmt;

/// Inline formats that toggle on and off over a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InlineFormat {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl InlineFormat {
    pub const ALL: [InlineFormat; 4] = [
        InlineFormat::Bold,
        InlineFormat::Italic,
        InlineFormat::Underline,
        InlineFormat::Strikethrough,
    ];

    /// Tag written when the format is applied.
    pub fn tag(self) -> &'static str {
        match self {
            InlineFormat::Bold => "b",
            InlineFormat::Italic => "i",
            InlineFormat::Underline => "u",
            InlineFormat::Strikethrough => "s",
        }
    }

    /// True when `tag` renders as this format.
    pub fn matches_tag(self, tag: &str) -> bool {
        match self {
            InlineFormat::Bold => matches!(tag, "b" | "strong"),
            InlineFormat::Italic => matches!(tag, "i" | "em"),
            InlineFormat::Underline => matches!(tag, "u" | "ins"),
            InlineFormat::Strikethrough => matches!(tag, "s" | "strike" | "del"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InlineFormat::Bold => "Bold",
            InlineFormat::Italic => "Italic",
            InlineFormat::Underline => "Underline",
            InlineFormat::Strikethrough => "Strikethrough",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn css_value(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ul" => Some(ListKind::Unordered),
            "ol" => Some(ListKind::Ordered),
            _ => None,
        }
    }
}

/// Block tags `formatBlock` can produce.
pub const BLOCK_FORMATS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
    "div",
    "address",
];

/// Accepts `<h1>` as well as `h1`, in any case.
pub fn parse_block_format(argument: &str) -> Option<&'static str> {
    let trimmed = argument.trim();
    let name = trimmed
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(trimmed)
        .trim()
        .to_ascii_lowercase();
    BLOCK_FORMATS.iter().copied().find(|tag| *tag == name)
}

/// Input a command needs from the user before it can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Link,
    Image,
    ForeColor,
    HiliteColor,
}

impl PromptKind {
    pub fn title(self) -> &'static str {
        match self {
            PromptKind::Link => "Insert link",
            PromptKind::Image => "Insert image",
            PromptKind::ForeColor => "Text colour",
            PromptKind::HiliteColor => "Highlight colour",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            PromptKind::Link => "https://",
            PromptKind::Image => "https://example.com/image.png",
            PromptKind::ForeColor | PromptKind::HiliteColor => "#ff0000",
        }
    }

    pub fn command(self) -> CommandName {
        match self {
            PromptKind::Link => CommandName::CreateLink,
            PromptKind::Image => CommandName::InsertImage,
            PromptKind::ForeColor => CommandName::ForeColor,
            PromptKind::HiliteColor => CommandName::HiliteColor,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandName {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
    InsertUnorderedList,
    InsertOrderedList,
    FormatBlock,
    CreateLink,
    InsertImage,
    ForeColor,
    HiliteColor,
    Undo,
    Redo,
}

impl CommandName {
    pub const ALL: [CommandName; 16] = [
        CommandName::Bold,
        CommandName::Italic,
        CommandName::Underline,
        CommandName::Strikethrough,
        CommandName::JustifyLeft,
        CommandName::JustifyCenter,
        CommandName::JustifyRight,
        CommandName::InsertUnorderedList,
        CommandName::InsertOrderedList,
        CommandName::FormatBlock,
        CommandName::CreateLink,
        CommandName::InsertImage,
        CommandName::ForeColor,
        CommandName::HiliteColor,
        CommandName::Undo,
        CommandName::Redo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommandName::Bold => "bold",
            CommandName::Italic => "italic",
            CommandName::Underline => "underline",
            CommandName::Strikethrough => "strikethrough",
            CommandName::JustifyLeft => "justifyLeft",
            CommandName::JustifyCenter => "justifyCenter",
            CommandName::JustifyRight => "justifyRight",
            CommandName::InsertUnorderedList => "insertUnorderedList",
            CommandName::InsertOrderedList => "insertOrderedList",
            CommandName::FormatBlock => "formatBlock",
            CommandName::CreateLink => "createLink",
            CommandName::InsertImage => "insertImage",
            CommandName::ForeColor => "foreColor",
            CommandName::HiliteColor => "hiliteColor",
            CommandName::Undo => "undo",
            CommandName::Redo => "redo",
        }
    }

    /// Command names are matched case-insensitively; `backColor` is accepted
    /// as an alias of `hiliteColor`.
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "backcolor" => Some(CommandName::HiliteColor),
            _ => Self::ALL
                .into_iter()
                .find(|command| command.as_str().eq_ignore_ascii_case(&lower)),
        }
    }

    pub fn prompt(self) -> Option<PromptKind> {
        match self {
            CommandName::CreateLink => Some(PromptKind::Link),
            CommandName::InsertImage => Some(PromptKind::Image),
            CommandName::ForeColor => Some(PromptKind::ForeColor),
            CommandName::HiliteColor => Some(PromptKind::HiliteColor),
            _ => None,
        }
    }

    pub fn inline_format(self) -> Option<InlineFormat> {
        match self {
            CommandName::Bold => Some(InlineFormat::Bold),
            CommandName::Italic => Some(InlineFormat::Italic),
            CommandName::Underline => Some(InlineFormat::Underline),
            CommandName::Strikethrough => Some(InlineFormat::Strikethrough),
            _ => None,
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named operation with its argument, empty when the command takes none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub name: CommandName,
    pub argument: String,
}

impl Command {
    pub fn new(name: CommandName) -> Self {
        Self {
            name,
            argument: String::new(),
        }
    }

    pub fn with_argument(name: CommandName, argument: impl Into<String>) -> Self {
        Self {
            name,
            argument: argument.into(),
        }
    }

    /// Parses `name` or `name:argument`, e.g. `formatBlock:<h1>`.
    pub fn parse(input: &str) -> Option<Self> {
        let (name, argument) = match input.split_once(':') {
            Some((name, argument)) => (name, argument),
            None => (input, ""),
        };
        CommandName::parse(name).map(|name| Command::with_argument(name, argument))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.argument.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.argument)
        }
    }
}
