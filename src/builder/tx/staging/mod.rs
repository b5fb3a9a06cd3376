use super::TxBuilderError;
use crate::primitives::{Certificate, Input, Output};

mod build;
#[cfg(test)]
mod tests;

#[derive(Default, PartialEq, Eq, Debug, Clone)]
pub struct StagingTransaction {
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub fee: Option<u64>,
    pub certificates: Vec<Certificate>,
}

impl StagingTransaction {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn input(mut self, input: Input) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn inputs(mut self, inputs: impl IntoIterator<Item = Input>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn outputs(mut self, outputs: impl IntoIterator<Item = Output>) -> Self {
        self.outputs.extend(outputs);
        self
    }

    pub fn fee(mut self, fee: u64) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Appends a certificate. Order is kept: the ledger applies certificates in sequence.
    pub fn add_certificate(mut self, certificate: Certificate) -> Self {
        if !self.certificates.contains(&certificate) {
            self.certificates.push(certificate);
        }
        self
    }

    pub fn validate(&self) -> Result<(), TxBuilderError> {
        if self.inputs.is_empty() {
            return Err(TxBuilderError::NoInputs);
        }
        Ok(())
    }
}
