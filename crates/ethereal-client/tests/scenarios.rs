//! End-to-end scenarios against known fixtures, one test per scenario.
//!
//! Where a scenario only needs already-unit-tested building blocks (ABI
//! encoding, revert decoding) the test asserts against literal expected
//! bytes rather than re-deriving them, so a change that breaks the
//! underlying encoding trips here too. Where a scenario needs a live peer
//! (Multicall3 over HTTP, WebSocket reconnect) the test stands up a small
//! hand-rolled mock server on localhost.

use std::time::Duration;

use ethereal_abi::{Schema, Value};
use ethereal_contract::Batch;
use ethereal_crypto::PrivateKey;
use ethereal_primitives::error::{Error, RevertKind};
use ethereal_primitives::{Address, Wei};
use ethereal_client::Reader;
use ethereal_transport::{HttpProvider, Provider, WsProvider};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// E1 — `keccak256("transfer(address,uint256)")[0..4]` is the well-known
/// ERC-20 transfer selector.
#[test]
fn e1_transfer_selector() {
    let sel = ethereal_abi::selector("transfer", &[Schema::Address, Schema::uint256()]);
    assert_eq!(sel, [0xa9, 0x05, 0x9c, 0xbb]);
}

/// E2 — encoding `transfer(0x...0001, 100)` starts with the selector and
/// ends with the two expected 32-byte words.
#[test]
fn e2_transfer_calldata_matches_known_hex() {
    let to = Address::from_hex("0x0000000000000000000000000000000000000001").unwrap();
    let calldata =
        ethereal_abi::encode_call("transfer", &[Schema::Address, Schema::uint256()], &[Value::Address(to), Value::uint(100u64)])
            .unwrap();
    let hex = ethereal_primitives::hex::encode_prefixed(&calldata);
    assert!(hex.starts_with("0xa9059cbb"));
    assert!(hex.ends_with(
        "0000000000000000000000000000000000000000000000000000000000000001\
0000000000000000000000000000000000000000000000000000000000000064"
    ));
}

/// E3 — the three canonical revert payload shapes decode to the documented
/// `(kind, reason)` pairs.
#[test]
fn e3_revert_decoder_matches_known_payloads() {
    let error_payload = ethereal_abi::encode_error("denied");
    let error_info = ethereal_abi::decode_revert(&error_payload);
    assert_eq!(error_info.kind, RevertKind::Error);
    assert_eq!(error_info.reason.as_deref(), Some("denied"));

    let panic_payload = ethereal_abi::encode_panic(0x11);
    let panic_info = ethereal_abi::decode_revert(&panic_payload);
    assert_eq!(panic_info.kind, RevertKind::Panic);
    assert_eq!(panic_info.reason.as_deref(), Some("arithmetic over/underflow"));

    let custom_info = ethereal_abi::decode_revert(&[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(custom_info.kind, RevertKind::Custom);
    assert_eq!(custom_info.reason, None);
    assert_eq!(custom_info.raw_hex, "0xdeadbeef");
}

const CHAIN_ID: u64 = 31337;

/// `nonce=0, gasPrice=1 gwei, gas=21000, to=0x70997970...dc79C8, value=1 wei, data=0x` —
/// the legacy transaction named by E4/E5.
fn known_legacy_tx() -> ethereal_tx::Transaction {
    ethereal_tx::Transaction::Legacy(ethereal_tx::LegacyTx {
        nonce: 0,
        gas_price: Wei::from_u64(1_000_000_000),
        gas_limit: 21_000,
        to: Some(Address::from_hex("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap()),
        value: Wei::from_u64(1),
        data: ethereal_primitives::HexData::empty(),
    })
}

/// E4 — the EIP-155 preimage for a known legacy transaction serializes to
/// a specific byte string (independently hand-derived, not re-run through
/// the encoder under test).
#[test]
fn e4_legacy_preimage_matches_known_bytes() {
    let preimage = known_legacy_tx().encode_for_signing(CHAIN_ID).unwrap();
    let expected = ethereal_primitives::hex::decode(
        "e580843b9aca008252089470997970c51812dc3a010c7d01b50e0d17dc79c80180827a698080",
    )
    .unwrap();
    assert_eq!(preimage, expected);
}

/// E5 — signing E4's digest with the well-known Hardhat/Anvil account #0
/// key recovers to that account's address, checked against the literal
/// address rather than the key's own `address()` (which would pass even
/// if the signing preimage were wrong, since recovery always recovers
/// whichever key actually signed).
#[tokio::test]
async fn e5_known_vector_sign_and_recover() {
    let tx = known_legacy_tx();
    let key = PrivateKey::from_hex("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80").unwrap();
    let chain_id = CHAIN_ID;
    let preimage = tx.encode_for_signing(chain_id).unwrap();
    let digest = ethereal_primitives::keccak::hash(&preimage);
    let signature = key.sign(&digest).unwrap();
    let recovered = tx.recover_sender(&signature, chain_id).unwrap();

    let expected = Address::from_hex("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
    assert_eq!(recovered, expected);
    assert!(signature.s <= secp256k1_half_order());
}

fn secp256k1_half_order() -> [u8; 32] {
    // N/2 for secp256k1, the low-s threshold.
    ethereal_primitives::hex::decode("7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0")
        .unwrap()
        .try_into()
        .unwrap()
}

/// E6 — a Multicall3 batch of `[balanceOf, name, an unrecognized call]`
/// against a mock node resolves three handles independently: two
/// successes and one decoded revert.
#[tokio::test]
async fn e6_multicall3_batch_resolves_each_handle() {
    let balance_return = ethereal_abi::encode_list(&[Value::uint(12_345u64)], &[Schema::uint256()]).unwrap();
    let name_return = ethereal_abi::encode_list(&[Value::String("Test Token".to_string())], &[Schema::String]).unwrap();
    let revert_return = ethereal_abi::encode_error("denied");

    let aggregate3_result = Value::Array(vec![
        Value::Tuple(vec![Value::Bool(true), Value::Bytes(balance_return)]),
        Value::Tuple(vec![Value::Bool(true), Value::Bytes(name_return)]),
        Value::Tuple(vec![Value::Bool(false), Value::Bytes(revert_return)]),
    ]);
    let aggregate3_output_schema = Schema::array(Schema::Tuple(vec![Schema::Bool, Schema::DynamicBytes]));
    let encoded = ethereal_abi::encode_list(&[aggregate3_result], &[aggregate3_output_schema]).unwrap();
    let body = format!(
        r#"{{"jsonrpc":"2.0","id":1,"result":"{}"}}"#,
        ethereal_primitives::hex::encode_prefixed(&encoded)
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_one_http_response(listener, body));

    let provider = Provider::Http(HttpProvider::new(format!("http://{addr}")).unwrap());
    let batch = Batch::new(Reader::new(provider));

    let token = Address::from_hex("0x5FbDB2315678afecb367f032d93F642f64180aa").unwrap();
    let holder = Address::from_hex("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap();

    let balance_calldata =
        ethereal_abi::encode_call("balanceOf", &[Schema::Address], &[Value::Address(holder)]).unwrap();
    let name_calldata = ethereal_abi::encode_call("name", &[], &[]).unwrap();
    let unknown_calldata = vec![0x12, 0x34, 0x56, 0x78];

    let balance_handle = batch.record(token, balance_calldata, vec![Schema::uint256()], true);
    let name_handle = batch.record(token, name_calldata, vec![Schema::String], true);
    let unknown_handle = batch.record(token, unknown_calldata, Vec::new(), true);

    batch.execute().await.unwrap();

    match balance_handle.get().unwrap().as_slice() {
        [Value::Uint(balance)] => assert_eq!(*balance, Wei::from_u64(12_345)),
        other => panic!("unexpected balanceOf result: {other:?}"),
    }
    match name_handle.get().unwrap().as_slice() {
        [Value::String(name)] => assert_eq!(name, "Test Token"),
        other => panic!("unexpected name result: {other:?}"),
    }
    match unknown_handle.get() {
        Err(Error::Revert(info)) => assert_eq!(info.reason.as_deref(), Some("denied")),
        other => panic!("expected a decoded revert, got {other:?}"),
    }
}

async fn serve_one_http_response(listener: TcpListener, body: String) {
    let (mut socket, _) = listener.accept().await.unwrap();
    let mut buf = [0u8; 8192];
    let _ = socket.read(&mut buf).await.unwrap();
    let response = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    let _ = socket.shutdown().await;
}

/// E7 — killing the WebSocket mid-stream fails every in-flight send with
/// `ConnectionLost`, then a transparent reconnect resubscribes under a new
/// server-side id and the next node notification still reaches the
/// caller's original [`ethereal_transport::Subscription`] handle.
#[tokio::test]
async fn e7_reconnect_fails_in_flight_and_resumes_subscriptions() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(run_reconnect_mock_server(listener));

    let provider = WsProvider::connect(format!("ws://{addr}")).await.unwrap();
    let mut subscription = provider.subscribe(serde_json::json!(["newHeads"])).await.unwrap();

    let in_flight = {
        let provider = provider.clone();
        tokio::spawn(async move { provider.send("eth_blockNumber", serde_json::json!([])).await })
    };

    let result = in_flight.await.unwrap();
    assert!(matches!(result, Err(Error::ConnectionLost)));

    let notification = tokio::time::timeout(Duration::from_secs(5), subscription.next())
        .await
        .expect("subscription should resume after reconnect")
        .expect("notification channel should not close");
    assert_eq!(notification, serde_json::json!("0x2a"));
}

async fn run_reconnect_mock_server(listener: TcpListener) {
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    let (stream1, _) = listener.accept().await.unwrap();
    let mut ws1 = tokio_tungstenite::accept_async(stream1).await.unwrap();

    let subscribe_request = ws1.next().await.unwrap().unwrap();
    let subscribe_id = request_id(&subscribe_request);
    ws1.send(WsMessage::Text(rpc_response(subscribe_id, "\"0xsub-1\"")))
        .await
        .unwrap();

    // A second request left deliberately unanswered, then the connection
    // is dropped out from under it.
    let _in_flight_request = ws1.next().await.unwrap().unwrap();
    drop(ws1);

    let (stream2, _) = listener.accept().await.unwrap();
    let mut ws2 = tokio_tungstenite::accept_async(stream2).await.unwrap();

    let resubscribe_request = ws2.next().await.unwrap().unwrap();
    let resubscribe_id = request_id(&resubscribe_request);
    ws2.send(WsMessage::Text(rpc_response(resubscribe_id, "\"0xsub-2\"")))
        .await
        .unwrap();
    ws2.send(WsMessage::Text(subscription_notification("0xsub-2", "\"0x2a\"")))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
}

fn request_id(message: &tokio_tungstenite::tungstenite::Message) -> u64 {
    let text = message.clone().into_text().unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    value["id"].as_u64().unwrap()
}

fn rpc_response(id: u64, result_json: &str) -> String {
    format!(r#"{{"jsonrpc":"2.0","id":{id},"result":{result_json}}}"#)
}

fn subscription_notification(subscription: &str, result_json: &str) -> String {
    format!(
        r#"{{"jsonrpc":"2.0","method":"eth_subscription","params":{{"subscription":"{subscription}","result":{result_json}}}}}"#
    )
}
