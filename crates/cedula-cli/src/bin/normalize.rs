// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cedula-normalize <image>: write `<stem>_processed.jpg` next to the input and
// print the result record.

use std::path::PathBuf;

fn main() {
    let Some(arg) = cedula_cli::first_arg() else {
        return;
    };
    cedula_cli::init_tracing();
    tracing::info!(path = %arg, "cedula-normalize starting");

    let path = PathBuf::from(arg);
    let record = cedula_cli::guarded(|| cedula_cli::run_normalize(&path));
    cedula_cli::print_record(&record);
}
