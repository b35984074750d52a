/*!
 * Block-boundary editing policy.
 *
 * A pure decision layer: given a document snapshot and the current
 * selection, each rule decides whether a keystroke falls through to the
 * host engine's default handling or is replaced by a list of edit
 * commands. The rules own no state; the whole "state machine" is the
 * `(document, selection)` pair handed in per keystroke.
 *
 * Rules are wired to keystrokes through an immutable [`BindingSet`] the
 * host installs once at construction; see `bindings`.
 */

pub mod bindings;
pub mod rules;

use crate::editing::{BlockKind, Cmd};

pub use bindings::{BindingSet, Key, KeyBinding, KeyInput};

/// Block kinds keystrokes can escape from into a plain paragraph.
pub const ESCAPABLE_KINDS: &[BlockKind] = &[
    BlockKind::Blockquote,
    BlockKind::Spoiler,
    BlockKind::CodeBlock,
];

/// Outcome of a policy rule for one keystroke.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Let the host's default handling run.
    Fallthrough,
    /// Apply these commands instead of the default handling.
    Override(Vec<Cmd>),
    /// Apply these commands as a side effect, then let the default
    /// handling run anyway (the arrow-key escapes).
    FallthroughAfter(Vec<Cmd>),
}

impl Decision {
    /// Whether the host's default handling should still run.
    pub fn propagates(&self) -> bool {
        !matches!(self, Decision::Override(_))
    }

    pub fn commands(&self) -> &[Cmd] {
        match self {
            Decision::Fallthrough => &[],
            Decision::Override(cmds) | Decision::FallthroughAfter(cmds) => cmds,
        }
    }
}
