// Library root
// -----------
// Command helpers for the themes CLI. The binary (`main.rs`) wires these
// together for the `preview` and `import` commands.
//
// Module responsibilities:
// - `context`: resolves the runtime connection context from flags, the
//   theme's config file and interactive prompts.
// - `preview`: builds the local preview upload body.
// - `api`: HTTP calls to the theme service (import jobs, preview upload).
// - `ui`: terminal prompts, spinner and status output.
// - `error`: the error type shared by the modules above.
pub mod api;
pub mod context;
pub mod error;
pub mod preview;
pub mod ui;

pub use context::{resolve, FlagValues, PromptPolicy, Prompter, RuntimeContext};
pub use error::{Result, ThemeError};
