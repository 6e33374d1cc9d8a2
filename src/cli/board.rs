//! pmb board launcher.

use std::sync::Arc;

use crate::cli::load_context;
use crate::client::Gateway;
use crate::error::{Error, Result};

pub struct BoardOptions {
    pub project: Option<String>,
    pub endpoint: Option<String>,
    pub org: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run(options: BoardOptions) -> Result<()> {
    if options.json {
        return Err(Error::InvalidArgument(
            "the board does not support --json".to_string(),
        ));
    }
    if options.quiet {
        return Err(Error::InvalidArgument(
            "the board does not support --quiet".to_string(),
        ));
    }

    let ctx = load_context(options.endpoint, options.org)?;
    let author_email = ctx.config.ui.author_email.clone();
    let gateway: Arc<dyn Gateway> = Arc::new(ctx.client);
    crate::ui::board::run(
        gateway,
        &ctx.organization,
        options.project.as_deref(),
        author_email,
    )
}
