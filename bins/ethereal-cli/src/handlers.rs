//! Command handlers: each builds a provider/reader (and a signer, for
//! `send`) from the parsed CLI args and prints a human-readable result.

use anyhow::{Context, Result};
use colored::Colorize;
use ethereal_client::{Reader, Signer, TransactionRequest};
use ethereal_crypto::PrivateKey;
use ethereal_primitives::{Address, BlockTag, HexData, Wei};
use ethereal_transport::{HttpProvider, Provider};

use crate::command::{BalanceArgs, BlockArgs, CallArgs, RpcArgs, SendArgs};

fn reader_for(rpc: &RpcArgs) -> Result<Reader> {
    let provider = HttpProvider::new(rpc.rpc.clone()).context("building HTTP provider")?;
    Ok(Reader::new(Provider::Http(provider)))
}

pub async fn chain_id(args: &RpcArgs) -> Result<()> {
    let reader = reader_for(args)?;
    let id = reader.chain_id().await?;
    println!("{} {}", "chain id:".bold(), id);
    Ok(())
}

pub async fn balance(args: &BalanceArgs) -> Result<()> {
    let reader = reader_for(&args.rpc)?;
    let address = Address::from_hex(&args.address).context("parsing address")?;
    let balance = reader.balance_of(address, BlockTag::LATEST).await?;
    println!("{} {}", "balance (wei):".bold(), balance);
    Ok(())
}

pub async fn block(args: &BlockArgs) -> Result<()> {
    let reader = reader_for(&args.rpc)?;
    let tag = match args.number {
        Some(number) => BlockTag::number(number),
        None => BlockTag::LATEST,
    };
    let block = reader.block_by_number(tag).await?;
    println!(
        "{} number={:?} transactions={} gas_used={}",
        "block:".bold(),
        block.number,
        block.transactions.len(),
        block.gas_used
    );
    Ok(())
}

pub async fn call(args: &CallArgs) -> Result<()> {
    let reader = reader_for(&args.rpc)?;
    let to = Address::from_hex(&args.to).context("parsing target address")?;
    let data = HexData::from_hex(&args.data).context("parsing calldata")?;
    let request = ethereal_client::CallRequest {
        to: Some(to),
        data: Some(data),
        ..Default::default()
    };
    let result = reader.call(&request, BlockTag::LATEST).await?;
    println!("{} {}", "result:".bold(), result.to_hex());
    Ok(())
}

pub async fn send(args: &SendArgs) -> Result<()> {
    let reader = reader_for(&args.rpc)?;
    let mut key_bytes = [0u8; 32];
    let decoded = ethereal_primitives::hex::decode(&args.private_key).context("parsing private key")?;
    anyhow::ensure!(decoded.len() == 32, "private key must be 32 bytes");
    key_bytes.copy_from_slice(&decoded);
    let key = PrivateKey::from_raw_bytes(&mut key_bytes).context("loading private key")?;

    let signer = Signer::new(reader, key);
    let to = Address::from_hex(&args.to).context("parsing recipient address")?;
    let value: u128 = args.value.parse().context("parsing value as wei")?;
    let request = TransactionRequest::transfer(to, Wei::from_u128(value));

    println!("{}", "broadcasting...".dimmed());
    let receipt = signer.send_transaction_and_wait_default(request).await?;
    println!(
        "{} hash={} status={}",
        "sent:".bold().green(),
        receipt.transaction_hash,
        receipt.succeeded()
    );
    Ok(())
}
