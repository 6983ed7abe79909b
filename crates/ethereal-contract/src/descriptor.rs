//! Method descriptors: the caller-declared ABI surface a [`crate::Contract`]
//! is bound against.

use ethereal_abi::Schema;
use ethereal_primitives::error::Error;
use ethereal_primitives::Result;

/// Whether a method reads state, writes state, or writes state while
/// accepting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    View,
    NonView,
    Payable,
}

/// A single contract method: its name, argument/return schemas, and
/// mutability. This is the ABI surface itself — there is no separate JSON
/// ABI document to validate against.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub inputs: Vec<Schema>,
    pub outputs: Vec<Schema>,
    pub mutability: Mutability,
}

impl MethodDescriptor {
    pub fn view(name: impl Into<String>, inputs: Vec<Schema>, outputs: Vec<Schema>) -> Self {
        MethodDescriptor {
            name: name.into(),
            inputs,
            outputs,
            mutability: Mutability::View,
        }
    }

    pub fn nonview(name: impl Into<String>, inputs: Vec<Schema>, outputs: Vec<Schema>) -> Self {
        MethodDescriptor {
            name: name.into(),
            inputs,
            outputs,
            mutability: Mutability::NonView,
        }
    }

    pub fn payable(name: impl Into<String>, inputs: Vec<Schema>, outputs: Vec<Schema>) -> Self {
        MethodDescriptor {
            name: name.into(),
            inputs,
            outputs,
            mutability: Mutability::Payable,
        }
    }

    /// Rejects a call shape this descriptor cannot serve: wrong argument
    /// count, or an attached value on a non-payable method.
    pub(crate) fn validate_call(&self, args_len: usize, value_attached: bool) -> Result<()> {
        if args_len != self.inputs.len() {
            return Err(Error::Transaction(format!(
                "method {} expects {} argument(s), got {}",
                self.name,
                self.inputs.len(),
                args_len
            )));
        }
        if value_attached && self.mutability != Mutability::Payable {
            return Err(Error::Transaction(format!(
                "method {} is not payable",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_value_on_a_non_payable_method() {
        let method = MethodDescriptor::view("balanceOf", vec![Schema::Address], vec![Schema::uint256()]);
        assert!(method.validate_call(1, true).is_err());
    }

    #[test]
    fn rejects_wrong_argument_count() {
        let method = MethodDescriptor::nonview("transfer", vec![Schema::Address, Schema::uint256()], vec![Schema::Bool]);
        assert!(method.validate_call(1, false).is_err());
        assert!(method.validate_call(2, false).is_ok());
    }
}
