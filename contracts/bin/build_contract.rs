//! Wasm entry binary for the points protocol contract.

#![cfg_attr(target_arch = "wasm32", no_std)]
#![cfg_attr(target_arch = "wasm32", no_main)]

#[cfg(target_arch = "wasm32")]
extern crate odra_casper_wasm_env;

#[cfg(target_arch = "wasm32")]
#[allow(unused_imports)]
use points_protocol_contracts::router::PointsProtocol;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    panic!("points_protocol_contracts_build_contract is intended to be built for wasm32-unknown-unknown only");
}
