// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::process;
use storefront_rs::Profile;
use storefront_rs::server::AppState;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Storefront - In-memory e-commerce backend
///
/// Serves a session-authenticated REST API for customer accounts, inventory,
/// purchases, and review moderation. State lives in memory and is lost on
/// shutdown.
#[derive(Parser, Debug)]
#[command(name = "storefront-rs")]
#[command(about = "An e-commerce backend with wallets, inventory, and reviews", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Seed a bootstrap admin account with this username
    ///
    /// Admin accounts only exist through seeding; no API route creates one.
    #[arg(long, requires = "admin_password")]
    admin_username: Option<String>,

    /// Password for the bootstrap admin account
    #[arg(long, requires = "admin_username")]
    admin_password: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = AppState::new();

    if let (Some(username), Some(password)) = (args.admin_username, args.admin_password) {
        let profile = Profile {
            full_name: "Administrator".to_string(),
            age: 0,
            address: String::new(),
            gender: String::new(),
            marital_status: String::new(),
        };
        match state
            .store
            .seed_admin(username.clone(), password, profile, Decimal::ZERO)
        {
            Ok(id) => tracing::info!(%username, %id, "seeded admin account"),
            Err(e) => {
                eprintln!("Error seeding admin account: {}", e);
                process::exit(1);
            }
        }
    }

    let listener = match TcpListener::bind(args.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Error binding to {}: {}", args.bind, e);
            process::exit(1);
        }
    };
    tracing::info!(addr = %args.bind, "listening");

    if let Err(e) = storefront_rs::server::serve(listener, state).await {
        eprintln!("Server error: {}", e);
        process::exit(1);
    }
}
