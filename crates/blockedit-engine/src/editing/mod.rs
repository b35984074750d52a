/*!
 * Editing core: the document substrate the keyboard policy runs against.
 *
 * The document model follows the wire format of the content-op stream it is
 * loaded from: the whole document is one linear character stream held in a
 * `xi_rope::Rope`, every line ends with exactly one `\n`, and the block
 * format of a line travels with its terminating newline. Multi-line block
 * kinds (quote, spoiler, code block) are derived spans over runs of equally
 * formatted lines; they are never stored as entities of their own.
 *
 * All mutation flows through [`Cmd`] values applied with
 * [`Document::apply`], which compiles text edits to rope deltas, keeps the
 * line format table in step with the buffer, transforms the selection and
 * returns a [`Patch`] describing what changed. The policy layer never
 * touches document state directly; it only produces command lists.
 *
 * Module structure:
 *
 * - `document`: the `Document` type, block kinds, and the apply pipeline
 * - `commands`: the `Cmd` enum, delta compilation, selection transforms
 * - `content`: content-op serialization (`getContents`/`setContents` form)
 * - `view`: owned `Line`/`BlockSpan` views and offset-based line lookup
 */

pub mod commands;
pub mod content;
pub mod document;
pub mod view;

pub use commands::{Cmd, Patch};
pub use content::{ContentError, ContentOp};
pub use document::{BlockKind, Document};
pub use view::{BlockSpan, Line};
