use std::io;

/// A typed RPC method: a name plus the encoders that turn its input and
/// output into the schemaless payloads carried on the wire.
///
/// Both sides of a call share one definition, so the caller's
/// `encode_request` always pairs with the handler's `decode_request`.
pub trait RpcMethodDefinition {
    /// The name the method is registered and invoked under.
    const METHOD_NAME: &'static str;

    /// The high-level input type (e.g., `Vec<f64>`).
    type Input;

    /// The high-level output type (e.g., `f64`).
    type Output;

    fn encode_request(input: Self::Input) -> Result<Vec<u8>, io::Error>;

    /// Decodes request params. Absent params are presented as an empty slice.
    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error>;

    fn encode_response(output: Self::Output) -> Result<Vec<u8>, io::Error>;

    /// Decodes a result payload. An absent result is presented as an empty slice.
    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error>;
}
