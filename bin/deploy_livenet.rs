//! Deploy the points protocol to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000
//!
//! Optional protocol parameters:
//!   POINTS_PER_ASSET_PER_EPOCH=10
//!   POINTS_INITIAL_RATE=1
//!   POINTS_INITIAL_RATE_DECIMALS=0
//!   POINTS_STAKE_TOKEN=hash-...
//!   POINTS_STAKE_TOKEN_DECIMALS=9
//!   POINTS_DEPLOYMENT_RECORD=deployments/points-protocol.json
//!
//! Set RUST_LOG=debug for verbose output.

use std::path::PathBuf;
use std::str::FromStr;

use log::{debug, info};
use odra::casper_types::U128;
use odra::host::{Deployer, HostRef};
use odra::prelude::*;
use serde::Serialize;

use points_protocol_contracts::router::{PointsProtocol, PointsProtocolInitArgs};

const DEFAULT_PAYMENT_AMOUNT: u64 = 200_000_000_000;
const DEFAULT_RECORD_PATH: &str = "deployments/points-protocol.json";

#[derive(Debug, thiserror::Error)]
enum DeployError {
    #[error("{name} is not a valid {expected}: {value}")]
    InvalidVar {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("failed to write deployment record: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode deployment record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Deployment parameters read from the environment.
#[derive(Debug)]
struct DeployConfig {
    payment_amount: u64,
    points_per_asset_per_epoch: u64,
    initial_rate: u128,
    initial_rate_decimals: u8,
    stake_token: Option<Address>,
    stake_token_decimals: u8,
    record_path: PathBuf,
}

impl DeployConfig {
    fn from_env() -> Result<Self, DeployError> {
        let stake_token = match std::env::var("POINTS_STAKE_TOKEN") {
            Ok(value) if !value.is_empty() => {
                let address = Address::from_str(&value).map_err(|_| DeployError::InvalidVar {
                    name: "POINTS_STAKE_TOKEN",
                    expected: "contract address",
                    value,
                })?;
                Some(address)
            }
            _ => None,
        };

        Ok(Self {
            payment_amount: parse_var("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT", DEFAULT_PAYMENT_AMOUNT)?,
            points_per_asset_per_epoch: parse_var("POINTS_PER_ASSET_PER_EPOCH", 10)?,
            initial_rate: parse_var("POINTS_INITIAL_RATE", 1)?,
            initial_rate_decimals: parse_var("POINTS_INITIAL_RATE_DECIMALS", 0)?,
            stake_token,
            stake_token_decimals: parse_var("POINTS_STAKE_TOKEN_DECIMALS", 9)?,
            record_path: std::env::var("POINTS_DEPLOYMENT_RECORD")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_RECORD_PATH)),
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, DeployError> {
    match std::env::var(name) {
        Ok(value) => value.parse().map_err(|_| DeployError::InvalidVar {
            name,
            expected: core::any::type_name::<T>(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

/// Written next to the binary so clients can find the contract.
#[derive(Debug, Serialize)]
struct DeploymentRecord {
    contract: &'static str,
    address: String,
    deployer: String,
    points_per_asset_per_epoch: u64,
    initial_rate: String,
    initial_rate_decimals: u8,
    stake_token: Option<String>,
    govern_cap_id: u64,
    oracle_cap_id: u64,
}

fn main() -> Result<(), DeployError> {
    // Load environment from .env file
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DeployConfig::from_env()?;
    debug!("deploy config: {:?}", config);

    info!("=== Points Protocol Livenet Deployment ===");

    let env = odra_casper_livenet_env::env();
    env.set_gas(config.payment_amount);

    let deployer = env.caller();
    info!("Deployer: {:?}", deployer);

    info!("Deploying PointsProtocol...");
    let protocol = PointsProtocol::deploy(
        &env,
        PointsProtocolInitArgs {
            points_per_asset_per_epoch: config.points_per_asset_per_epoch,
            initial_rate: U128::from(config.initial_rate),
            initial_rate_decimals: config.initial_rate_decimals,
            stake_token: config.stake_token,
            stake_token_decimals: config.stake_token_decimals,
        },
    );
    info!("PointsProtocol deployed at: {:?}", protocol.address());

    let record = DeploymentRecord {
        contract: "PointsProtocol",
        address: format!("{:?}", protocol.address()),
        deployer: format!("{:?}", deployer),
        points_per_asset_per_epoch: config.points_per_asset_per_epoch,
        initial_rate: config.initial_rate.to_string(),
        initial_rate_decimals: config.initial_rate_decimals,
        stake_token: config.stake_token.map(|token| format!("{:?}", token)),
        govern_cap_id: 1,
        oracle_cap_id: 1,
    };

    if let Some(dir) = config.record_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&config.record_path, serde_json::to_string_pretty(&record)?)?;
    info!("Deployment record written to {}", config.record_path.display());

    Ok(())
}
