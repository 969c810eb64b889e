use pairswap_core::{hash_blake3, Hash};

/// Compute state root from key-value pairs
/// Uses sorted keys for determinism
pub fn compute_state_root<'a, I>(entries: I) -> Hash
where
    I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
{
    let mut sorted: Vec<_> = entries.into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut level: Vec<Hash> = sorted
        .iter()
        .map(|(k, v)| {
            // Length-prefix the key so (ab, c) and (a, bc) hash differently
            let mut data = Vec::with_capacity(8 + k.len() + v.len());
            data.extend_from_slice(&(k.len() as u64).to_le_bytes());
            data.extend_from_slice(k);
            data.extend_from_slice(v);
            hash_blake3(&data)
        })
        .collect();

    if level.is_empty() {
        return Hash::ZERO;
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let right = pair.get(1).unwrap_or(&pair[0]);
                let mut data = [0u8; 64];
                data[..32].copy_from_slice(pair[0].as_bytes());
                data[32..].copy_from_slice(right.as_bytes());
                hash_blake3(&data)
            })
            .collect();
    }

    level[0]
}
