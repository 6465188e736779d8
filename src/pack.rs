/*!
Length-prefixed chunk packing for handshake messages.

Chunks are prefixed with a fixed-width big-endian u32 length. Unpacking
reads from a cursor and tolerates trailing bytes, since a signature follows
the packed chunks in a signed handshake message.
*/

use bytes::{Buf, BufMut};

use crate::constants::sizes;

/// Append `chunk` to `buffer` behind a u32 length prefix.
pub fn pack_chunk(buffer: &mut Vec<u8>, chunk: &[u8]) {
    buffer.put_u32(chunk.len() as u32);
    buffer.put_slice(chunk);
}

/// Read one length-prefixed chunk from the front of `cursor`, advancing it
/// past the chunk. Returns `None` if the prefix is truncated or claims more
/// bytes than remain.
pub fn unpack_chunk(cursor: &mut &[u8]) -> Option<Vec<u8>> {
    if cursor.remaining() < sizes::CHUNK_PREFIX {
        return None;
    }

    let length = cursor.get_u32() as usize;
    if cursor.remaining() < length {
        return None;
    }

    let mut chunk = vec![0u8; length];
    cursor.copy_to_slice(&mut chunk);
    Some(chunk)
}
