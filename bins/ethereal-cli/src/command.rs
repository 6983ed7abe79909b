//! holding command related structures
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[clap(name = "ethereal", bin_name = "ethereal")]
#[clap(version, about = "A thin CLI over the ethereal EVM JSON-RPC toolkit")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the node's chain id
    ChainId(RpcArgs),

    /// Fetch an address's balance at `latest`
    Balance(BalanceArgs),

    /// Fetch a block by number
    Block(BlockArgs),

    /// Call a view method and print the raw return bytes
    Call(CallArgs),

    /// Sign and broadcast a transfer, waiting for its receipt
    Send(SendArgs),
}

#[derive(Args)]
pub struct RpcArgs {
    /// JSON-RPC endpoint (http:// or ws://)
    #[clap(long, default_value = "http://127.0.0.1:8545")]
    pub rpc: String,
}

#[derive(Args)]
pub struct BalanceArgs {
    #[clap(flatten)]
    pub rpc: RpcArgs,

    /// Address to query
    pub address: String,
}

#[derive(Args)]
pub struct BlockArgs {
    #[clap(flatten)]
    pub rpc: RpcArgs,

    /// Block number; omit for `latest`
    pub number: Option<u64>,
}

#[derive(Args)]
pub struct CallArgs {
    #[clap(flatten)]
    pub rpc: RpcArgs,

    /// Target contract address
    pub to: String,

    /// Hex-encoded calldata (with or without `0x`)
    pub data: String,
}

#[derive(Args)]
pub struct SendArgs {
    #[clap(flatten)]
    pub rpc: RpcArgs,

    /// Hex-encoded private key (with or without `0x`)
    #[clap(long)]
    pub private_key: String,

    /// Recipient address
    pub to: String,

    /// Value to send, in wei
    #[clap(long, default_value = "0")]
    pub value: String,
}
