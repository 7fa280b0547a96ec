/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod commands;
mod config;
mod input;

use std::process::exit;

#[tokio::main]
async fn main() {
    if let Err(e) = commands::base::run_cli().await {
        eprintln!("{}", e);
        exit(1);
    }
}
