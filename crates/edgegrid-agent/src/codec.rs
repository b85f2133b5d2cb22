//! Protobuf codec for the `NodeAgent` service.
//!
//! Encoding is plain prost. A message that fails to decode means the peer
//! speaks something other than this protocol, so the decoder reports it as
//! `UNAVAILABLE` instead of prost's `INTERNAL`.

use std::marker::PhantomData;

use prost::Message;
use tonic::Status;
use tonic::codec::{Codec, DecodeBuf, Decoder, ProstCodec};

/// [`ProstCodec`] with wire decode failures surfaced as unavailability.
#[derive(Debug, Clone)]
pub struct AgentCodec<T, U> {
    inner: ProstCodec<T, U>,
}

impl<T, U> Default for AgentCodec<T, U> {
    fn default() -> Self {
        AgentCodec { inner: ProstCodec::default() }
    }
}

impl<T, U> Codec for AgentCodec<T, U>
where
    T: Message + Send + 'static,
    U: Message + Default + Send + 'static,
{
    type Encode = T;
    type Decode = U;
    type Encoder = <ProstCodec<T, U> as Codec>::Encoder;
    type Decoder = AgentDecoder<U>;

    fn encoder(&mut self) -> Self::Encoder {
        self.inner.encoder()
    }

    fn decoder(&mut self) -> Self::Decoder {
        AgentDecoder(PhantomData)
    }
}

#[derive(Debug)]
pub struct AgentDecoder<U>(PhantomData<U>);

impl<U: Message + Default> Decoder for AgentDecoder<U> {
    type Item = U;
    type Error = Status;

    fn decode(&mut self, buf: &mut DecodeBuf<'_>) -> Result<Option<U>, Status> {
        U::decode(buf)
            .map(Some)
            .map_err(|e| Status::unavailable(format!("malformed message: {e}")))
    }
}
