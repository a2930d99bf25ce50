//! Turns toolbar commands into edits on the mounted surface.

use tracing::debug;

use crate::command::{Alignment, Command, CommandName, ListKind, parse_block_format};
use crate::surface::EditingSurface;

/// What happened to a command handed to [`CommandDispatcher::execute`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// No surface was mounted; nothing ran and nobody is notified.
    Unmounted,
    /// A command that needs user input arrived without any.
    MissingArgument,
    /// The primitive ran. `changed` is false when it had no visible effect,
    /// but a mutation notification is queued either way.
    Applied { changed: bool },
}

impl Dispatch {
    pub fn was_dispatched(self) -> bool {
        matches!(self, Dispatch::Applied { .. })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CommandDispatcher;

impl CommandDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Focuses the surface, runs the primitive for `command` and queues a
    /// mutation notification whether or not anything changed.
    pub fn execute(&self, surface: Option<&mut EditingSurface>, command: &Command) -> Dispatch {
        let Some(surface) = surface else {
            debug!(%command, "no surface mounted, command ignored");
            return Dispatch::Unmounted;
        };
        if command.name.prompt().is_some() && command.argument.trim().is_empty() {
            debug!(%command, "command needs an argument, not dispatched");
            return Dispatch::MissingArgument;
        }

        surface.focus();
        let changed = apply(surface, command);
        debug!(%command, changed, "command dispatched");
        surface.notify_mutation();
        Dispatch::Applied { changed }
    }

    /// Dispatches a command given by name. Unknown names change nothing but
    /// still notify a mounted surface.
    pub fn execute_named(
        &self,
        surface: Option<&mut EditingSurface>,
        name: &str,
        argument: &str,
    ) -> Dispatch {
        if let Some(name) = CommandName::parse(name) {
            return self.execute(surface, &Command::with_argument(name, argument));
        }
        let Some(surface) = surface else {
            debug!(name, "no surface mounted, command ignored");
            return Dispatch::Unmounted;
        };
        debug!(name, "unknown command");
        surface.focus();
        surface.notify_mutation();
        Dispatch::Applied { changed: false }
    }
}

fn apply(surface: &mut EditingSurface, command: &Command) -> bool {
    let argument = command.argument.trim();
    match command.name {
        CommandName::Bold
        | CommandName::Italic
        | CommandName::Underline
        | CommandName::Strikethrough => command
            .name
            .inline_format()
            .is_some_and(|format| surface.toggle_format(format)),
        CommandName::JustifyLeft => surface.set_alignment(Alignment::Left),
        CommandName::JustifyCenter => surface.set_alignment(Alignment::Center),
        CommandName::JustifyRight => surface.set_alignment(Alignment::Right),
        CommandName::InsertUnorderedList => surface.toggle_list(ListKind::Unordered),
        CommandName::InsertOrderedList => surface.toggle_list(ListKind::Ordered),
        CommandName::FormatBlock => match parse_block_format(argument) {
            Some(tag) => surface.format_block(tag),
            None => {
                debug!(argument, "unknown block format");
                false
            }
        },
        CommandName::CreateLink => surface.create_link(argument),
        CommandName::InsertImage => surface.insert_image(argument),
        CommandName::ForeColor => surface.fore_color(argument),
        CommandName::HiliteColor => surface.hilite_color(argument),
        CommandName::Undo => surface.undo(),
        CommandName::Redo => surface.redo(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Selection;
    use crate::surface::SurfaceEvent;

    fn mounted(content: &str) -> EditingSurface {
        let mut surface = EditingSurface::from_content(content);
        surface.select_all();
        surface.drain_events();
        surface
    }

    #[test]
    fn unmounted_surfaces_are_a_silent_no_op() {
        let dispatcher = CommandDispatcher::new();
        let outcome = dispatcher.execute(None, &Command::new(CommandName::Bold));
        assert_eq!(outcome, Dispatch::Unmounted);
        assert!(!outcome.was_dispatched());
    }

    #[test]
    fn commands_focus_the_surface_and_notify() {
        let mut surface = mounted("<p>x</p>");
        let outcome = CommandDispatcher::new().execute(Some(&mut surface), &Command::new(CommandName::Bold));
        assert_eq!(outcome, Dispatch::Applied { changed: true });
        assert!(surface.is_focused());
        assert_eq!(surface.serialized_content(), "<p><b>x</b></p>");
        assert!(surface.drain_events().contains(&SurfaceEvent::Mutation));
    }

    #[test]
    fn ineffective_commands_still_notify() {
        let mut surface = mounted("<p>x</p>");
        let command = Command::with_argument(CommandName::FormatBlock, "<marquee>");
        let outcome = CommandDispatcher::new().execute(Some(&mut surface), &command);
        assert_eq!(outcome, Dispatch::Applied { changed: false });
        assert_eq!(surface.serialized_content(), "<p>x</p>");
        assert_eq!(surface.drain_events(), vec![SurfaceEvent::Mutation]);
    }

    #[test]
    fn prompt_commands_without_input_are_not_dispatched() {
        let mut surface = mounted("<p>x</p>");
        for name in [
            CommandName::CreateLink,
            CommandName::InsertImage,
            CommandName::ForeColor,
            CommandName::HiliteColor,
        ] {
            let command = Command::with_argument(name, "  ");
            let outcome = CommandDispatcher::new().execute(Some(&mut surface), &command);
            assert_eq!(outcome, Dispatch::MissingArgument);
        }
        assert!(!surface.has_pending_events());
        assert!(!surface.is_focused());
    }

    #[test]
    fn unknown_names_only_notify() {
        let dispatcher = CommandDispatcher::new();
        let mut surface = mounted("<p>x</p>");
        let outcome = dispatcher.execute_named(Some(&mut surface), "selectAll", "");
        assert_eq!(outcome, Dispatch::Applied { changed: false });
        assert_eq!(surface.drain_events(), vec![SurfaceEvent::Mutation]);

        let outcome = dispatcher.execute_named(Some(&mut surface), "formatBlock", "<h1>");
        assert_eq!(outcome, Dispatch::Applied { changed: true });
        assert_eq!(dispatcher.execute_named(None, "bogus", ""), Dispatch::Unmounted);
    }

    #[test]
    fn every_command_maps_to_its_primitive() {
        let cases = [
            (Command::new(CommandName::Italic), "<p><i>x</i></p>"),
            (Command::new(CommandName::Underline), "<p><u>x</u></p>"),
            (Command::new(CommandName::Strikethrough), "<p><s>x</s></p>"),
            (
                Command::new(CommandName::JustifyCenter),
                "<p style=\"text-align: center;\">x</p>",
            ),
            (
                Command::new(CommandName::JustifyRight),
                "<p style=\"text-align: right;\">x</p>",
            ),
            (Command::new(CommandName::InsertUnorderedList), "<ul><li>x</li></ul>"),
            (Command::new(CommandName::InsertOrderedList), "<ol><li>x</li></ol>"),
            (Command::with_argument(CommandName::FormatBlock, "<h2>"), "<h2>x</h2>"),
            (Command::with_argument(CommandName::FormatBlock, "blockquote"), "<blockquote>x</blockquote>"),
            (
                Command::with_argument(CommandName::CreateLink, "/a"),
                "<p><a href=\"/a\">x</a></p>",
            ),
            (
                Command::with_argument(CommandName::InsertImage, "/i.png"),
                "<p><img src=\"/i.png\"></p>",
            ),
            (
                Command::with_argument(CommandName::ForeColor, "#ff0000"),
                "<p><font color=\"#ff0000\">x</font></p>",
            ),
            (
                Command::with_argument(CommandName::HiliteColor, "#ffff00"),
                "<p><span style=\"background-color: #ffff00;\">x</span></p>",
            ),
        ];
        for (command, expected) in cases {
            let mut surface = mounted("<p>x</p>");
            CommandDispatcher::new().execute(Some(&mut surface), &command);
            assert_eq!(surface.serialized_content(), expected, "{command}");
        }
    }

    #[test]
    fn undo_and_redo_go_through_the_dispatcher() {
        let dispatcher = CommandDispatcher::new();
        let mut surface = mounted("<p>x</p>");
        dispatcher.execute(Some(&mut surface), &Command::new(CommandName::Bold));
        dispatcher.execute(Some(&mut surface), &Command::new(CommandName::Undo));
        assert_eq!(surface.serialized_content(), "<p>x</p>");
        assert_eq!(surface.selection(), Selection::new(0, 1));
        dispatcher.execute(Some(&mut surface), &Command::new(CommandName::Redo));
        assert_eq!(surface.serialized_content(), "<p><b>x</b></p>");
    }
}
