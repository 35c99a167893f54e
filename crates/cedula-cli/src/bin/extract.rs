// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cedula-extract <image>: OCR the image, clean the text, print the result record.

use std::path::PathBuf;

fn main() {
    let Some(arg) = cedula_cli::first_arg() else {
        return;
    };
    cedula_cli::init_tracing();
    tracing::info!(path = %arg, "cedula-extract starting");

    let path = PathBuf::from(arg);
    let record = cedula_cli::guarded(|| cedula_cli::run_extract(&path));
    cedula_cli::print_record(&record);
}
