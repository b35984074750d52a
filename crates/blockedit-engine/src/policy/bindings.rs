//! Keystroke-to-rule wiring.
//!
//! The policy exposes its rules as an immutable, ordered [`BindingSet`]
//! the host installs once at editor construction. Each [`KeyBinding`]
//! carries the match criteria of the host's keybinding contract (key,
//! shift state, selection shape, offset within the line, block kinds) and
//! a pure handler. [`BindingSet::dispatch`] returns `true` when the
//! host's default handling should still run.

use std::ops::Range;

use crate::editing::BlockKind;
use crate::engine::{DocumentQuery, EditingEngine};
use crate::policy::{rules, Decision, ESCAPABLE_KINDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Backspace,
    Up,
    Down,
    Left,
    Right,
}

/// One keystroke as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
}

impl KeyInput {
    pub fn plain(key: Key) -> Self {
        Self { key, shift: false }
    }
}

pub type Handler = fn(&dyn DocumentQuery, &Range<usize>) -> Decision;

/// Match criteria plus handler for one keystroke rule.
///
/// `None` criteria match anything; `formats` is matched against the block
/// kind of the line under the selection start.
#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    pub name: &'static str,
    pub key: Key,
    pub shift: Option<bool>,
    pub collapsed: Option<bool>,
    pub offset: Option<usize>,
    pub formats: &'static [BlockKind],
    pub handler: Handler,
}

impl KeyBinding {
    fn matches(&self, doc: &dyn DocumentQuery, input: KeyInput, range: &Range<usize>) -> bool {
        if self.key != input.key {
            return false;
        }
        if let Some(shift) = self.shift
            && shift != input.shift
        {
            return false;
        }
        if let Some(collapsed) = self.collapsed
            && collapsed != (range.start == range.end)
        {
            return false;
        }
        let (line, offset_in_line) = doc.line_at(range.start);
        if let Some(offset) = self.offset
            && offset != offset_in_line
        {
            return false;
        }
        if !self.formats.is_empty() && !self.formats.contains(&line.kind) {
            return false;
        }
        true
    }
}

/// The immutable rule table a host installs once.
pub struct BindingSet {
    bindings: Vec<KeyBinding>,
}

impl BindingSet {
    /// The full block-escape rule set, in evaluation order.
    pub fn standard() -> Self {
        Self {
            bindings: vec![
                KeyBinding {
                    name: "strip format on first-position selection",
                    key: Key::Backspace,
                    shift: None,
                    collapsed: Some(false),
                    offset: None,
                    formats: ESCAPABLE_KINDS,
                    handler: rules::strip_first_position_selection,
                },
                KeyBinding {
                    name: "block escape backspace",
                    key: Key::Backspace,
                    shift: None,
                    collapsed: Some(true),
                    offset: Some(0),
                    formats: ESCAPABLE_KINDS,
                    handler: rules::escape_block_backspace,
                },
                KeyBinding {
                    name: "multiline escape enter",
                    key: Key::Enter,
                    shift: None,
                    collapsed: Some(true),
                    offset: None,
                    formats: &[BlockKind::Blockquote, BlockKind::Spoiler],
                    handler: rules::escape_multiline_enter,
                },
                KeyBinding {
                    name: "code block escape enter",
                    key: Key::Enter,
                    shift: None,
                    collapsed: Some(true),
                    offset: None,
                    formats: &[BlockKind::CodeBlock],
                    handler: rules::escape_code_block_enter,
                },
                KeyBinding {
                    name: "block escape up",
                    key: Key::Up,
                    shift: None,
                    collapsed: Some(true),
                    offset: None,
                    formats: ESCAPABLE_KINDS,
                    handler: rules::escape_before_document,
                },
                KeyBinding {
                    name: "block escape left",
                    key: Key::Left,
                    shift: None,
                    collapsed: Some(true),
                    offset: None,
                    formats: ESCAPABLE_KINDS,
                    handler: rules::escape_before_document,
                },
                KeyBinding {
                    name: "block escape down",
                    key: Key::Down,
                    shift: None,
                    collapsed: Some(true),
                    offset: None,
                    formats: ESCAPABLE_KINDS,
                    handler: rules::escape_after_document,
                },
                KeyBinding {
                    name: "block escape right",
                    key: Key::Right,
                    shift: None,
                    collapsed: Some(true),
                    offset: None,
                    formats: ESCAPABLE_KINDS,
                    handler: rules::escape_after_document,
                },
            ],
        }
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// Decide one keystroke against the engine's current selection and
    /// apply whatever the matching rules produce.
    ///
    /// Returns `true` when the host's default handling should still run.
    /// Bindings are evaluated in registration order against the selection
    /// as it was when the keystroke arrived; the first override consumes
    /// the event, side-effect decisions apply and keep going.
    pub fn dispatch<E: EditingEngine>(&self, engine: &mut E, input: KeyInput) -> bool {
        let range = engine.selection();
        for binding in &self.bindings {
            if !binding.matches(&*engine, input, &range) {
                continue;
            }
            let decision = (binding.handler)(&*engine, &range);
            tracing::debug!(binding = binding.name, ?decision, "keystroke decided");
            match decision {
                Decision::Fallthrough => {}
                Decision::FallthroughAfter(cmds) => {
                    for cmd in cmds {
                        engine.apply(cmd);
                    }
                }
                Decision::Override(cmds) => {
                    for cmd in cmds {
                        engine.apply(cmd);
                    }
                    return false;
                }
            }
        }
        true
    }
}

impl Default for BindingSet {
    fn default() -> Self {
        Self::standard()
    }
}
