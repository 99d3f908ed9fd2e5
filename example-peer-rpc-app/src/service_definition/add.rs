use bitcode::{Decode, Encode};
use peer_rpc::rpc::RpcMethodDefinition;
use std::io;

#[derive(Encode, Decode, PartialEq, Debug)]
struct AddRequestParams {
    pub numbers: Vec<f64>,
}

#[derive(Encode, Decode, PartialEq, Debug)]
struct AddResponseParams {
    pub result: f64,
}

pub struct Add;

impl RpcMethodDefinition for Add {
    const METHOD_NAME: &'static str = "add";

    type Input = Vec<f64>;
    type Output = f64;

    fn encode_request(numbers: Self::Input) -> Result<Vec<u8>, io::Error> {
        Ok(bitcode::encode(&AddRequestParams { numbers }))
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error> {
        let raw = bitcode::decode::<AddRequestParams>(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(raw.numbers)
    }

    fn encode_response(result: Self::Output) -> Result<Vec<u8>, io::Error> {
        Ok(bitcode::encode(&AddResponseParams { result }))
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error> {
        let raw = bitcode::decode::<AddResponseParams>(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(raw.result)
    }
}
