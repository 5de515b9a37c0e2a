// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use log::LevelFilter;

pub(crate) struct Logger;

impl Logger {
    /// Honours `RUST_LOG`, unless `verbose` asks for everything.
    pub fn initialize(verbose: bool) {
        let mut builder = env_logger::Builder::from_default_env();
        builder.format_timestamp(None);

        if verbose {
            builder.filter_level(LevelFilter::Trace);
        }

        builder.init();
        log::trace!("Logger is initialized");
    }
}
