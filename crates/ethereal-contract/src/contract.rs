//! Contract facade: bind a caller-declared method set onto an address,
//! dispatch each invocation over `reader.call` or
//! `signer.send_transaction_and_wait` depending on mutability
//! "Binding").

use std::collections::HashMap;

use ethereal_abi::{decode_returns, encode_call, Value};
use ethereal_client::{CallRequest, Reader, Receipt, Signer, TransactionRequest};
use ethereal_primitives::error::Error;
use ethereal_primitives::{Address, BlockTag, HexData, Result, Wei};

use crate::descriptor::{MethodDescriptor, Mutability};

/// A contract address bound to a set of method descriptors and a reader
/// (and, for write methods, a signer).
pub struct Contract {
    address: Address,
    reader: Reader,
    signer: Option<Signer>,
    methods: HashMap<String, MethodDescriptor>,
}

impl Contract {
    /// Binds `descriptors` onto `address`. Rejects duplicate method names;
    /// every other bind-time check (argument arity, payable-vs-view) is
    /// structural in [`MethodDescriptor`] and re-checked per invocation.
    pub fn bind(address: Address, reader: Reader, signer: Option<Signer>, descriptors: Vec<MethodDescriptor>) -> Result<Self> {
        let mut methods = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let name = descriptor.name.clone();
            if methods.insert(name.clone(), descriptor).is_some() {
                return Err(Error::Transaction(format!("duplicate method descriptor for {name}")));
            }
        }
        Ok(Contract {
            address,
            reader,
            signer,
            methods,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn method(&self, name: &str) -> Result<&MethodDescriptor> {
        self.methods
            .get(name)
            .ok_or_else(|| Error::Transaction(format!("no method descriptor named {name}")))
    }

    fn signer(&self) -> Result<&Signer> {
        self.signer
            .as_ref()
            .ok_or_else(|| Error::Transaction("this binding has no signer; only view methods are usable".to_string()))
    }

    /// Calls a `view` method and decodes its return values.
    pub async fn view(&self, name: &str, args: &[Value]) -> Result<Vec<Value>> {
        let method = self.method(name)?;
        method.validate_call(args.len(), false)?;
        if method.mutability != Mutability::View {
            return Err(Error::Transaction(format!("method {name} is not a view method")));
        }
        let calldata = encode_call(name, &method.inputs, args)?;
        let request = CallRequest {
            to: Some(self.address),
            data: Some(HexData::from_bytes(calldata)),
            ..Default::default()
        };
        let result = self.reader.call(&request, BlockTag::LATEST).await?;
        decode_returns(result.as_bytes(), &method.outputs)
    }

    /// Sends a `nonview` method and waits for its receipt.
    pub async fn send(&self, name: &str, args: &[Value]) -> Result<Receipt> {
        self.send_with_value(name, args, Wei::ZERO).await
    }

    /// Sends a `payable` method with `value` attached and waits for its
    /// receipt.
    pub async fn send_payable(&self, name: &str, args: &[Value], value: Wei) -> Result<Receipt> {
        self.send_with_value(name, args, value).await
    }

    async fn send_with_value(&self, name: &str, args: &[Value], value: Wei) -> Result<Receipt> {
        let method = self.method(name)?;
        method.validate_call(args.len(), value != Wei::ZERO)?;
        if method.mutability == Mutability::View {
            return Err(Error::Transaction(format!("method {name} is a view method")));
        }
        let calldata = encode_call(name, &method.inputs, args)?;
        let request = TransactionRequest::call(self.address, HexData::from_bytes(calldata)).with_value(value);
        self.signer()?.send_transaction_and_wait_default(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereal_abi::Schema;
    use ethereal_transport::{HttpProvider, Provider};

    fn reader() -> Reader {
        Reader::new(Provider::Http(HttpProvider::new("http://localhost:8545").unwrap()))
    }

    #[tokio::test]
    async fn rejects_an_unknown_method() {
        let contract = Contract::bind(Address::ZERO, reader(), None, vec![]).unwrap();
        let err = contract.view("balanceOf", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Transaction(_)));
    }

    #[tokio::test]
    async fn rejects_calling_a_view_method_as_a_send() {
        let descriptor = MethodDescriptor::view("balanceOf", vec![Schema::Address], vec![Schema::uint256()]);
        let contract = Contract::bind(Address::ZERO, reader(), None, vec![descriptor]).unwrap();
        let err = contract
            .send("balanceOf", &[Value::Address(Address::ZERO)])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transaction(_)));
    }

    #[test]
    fn rejects_duplicate_method_names() {
        let a = MethodDescriptor::view("balanceOf", vec![Schema::Address], vec![Schema::uint256()]);
        let b = MethodDescriptor::view("balanceOf", vec![Schema::Address], vec![Schema::uint256()]);
        assert!(Contract::bind(Address::ZERO, reader(), None, vec![a, b]).is_err());
    }
}
