use bitcode::{Decode, Encode};
use peer_rpc::rpc::RpcMethodDefinition;
use std::io;

#[derive(Encode, Decode, PartialEq, Debug)]
struct MultRequestParams {
    pub numbers: Vec<f64>,
}

#[derive(Encode, Decode, PartialEq, Debug)]
struct MultResponseParams {
    pub result: f64,
}

pub struct Mult;

impl RpcMethodDefinition for Mult {
    const METHOD_NAME: &'static str = "mult";

    type Input = Vec<f64>;
    type Output = f64;

    fn encode_request(numbers: Self::Input) -> Result<Vec<u8>, io::Error> {
        Ok(bitcode::encode(&MultRequestParams { numbers }))
    }

    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error> {
        let raw = bitcode::decode::<MultRequestParams>(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(raw.numbers)
    }

    fn encode_response(result: Self::Output) -> Result<Vec<u8>, io::Error> {
        Ok(bitcode::encode(&MultResponseParams { result }))
    }

    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error> {
        let raw = bitcode::decode::<MultResponseParams>(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(raw.result)
    }
}
