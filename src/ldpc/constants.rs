//! LDPC(174,91) matrices of the FT8 standard
//!
//! Both tables are fixed reference data: the sparse parity-check adjacency
//! drives belief propagation, the dense generator rows produce parity bits
//! when encoding. The 0-based adjacency used by the decoder inner loops is
//! derived from `NM` once at startup.

use once_cell::sync::Lazy;

/// Codeword length.
pub const N: usize = 174;
/// Systematic length (77 payload + 14 CRC bits).
pub const K: usize = 91;
/// Parity checks.
pub const M: usize = 83;
/// Checks per variable.
pub const NCW: usize = 3;
/// Longest check row.
pub const MAX_NRW: usize = 7;

/// Parity-check rows: the variables (1-based, zero padded) participating in
/// each of the 83 checks.
pub const NM: [[u16; MAX_NRW]; M] = [
    [4, 31, 59, 91, 92, 96, 153],
    [5, 32, 60, 93, 115, 146, 0],
    [6, 24, 61, 94, 122, 151, 0],
    [7, 33, 62, 95, 96, 143, 0],
    [8, 25, 63, 83, 93, 96, 148],
    [6, 32, 64, 97, 126, 138, 0],
    [5, 34, 65, 78, 98, 107, 154],
    [9, 35, 66, 99, 139, 146, 0],
    [10, 36, 67, 100, 107, 126, 0],
    [11, 37, 67, 87, 101, 139, 158],
    [12, 38, 68, 102, 105, 155, 0],
    [13, 39, 69, 103, 149, 162, 0],
    [8, 40, 70, 82, 104, 114, 145],
    [14, 41, 71, 88, 102, 123, 156],
    [15, 42, 59, 106, 123, 159, 0],
    [1, 33, 72, 106, 107, 157, 0],
    [16, 43, 73, 108, 141, 160, 0],
    [17, 37, 74, 81, 109, 131, 154],
    [11, 44, 75, 110, 121, 166, 0],
    [45, 55, 64, 111, 130, 161, 173],
    [8, 46, 71, 112, 119, 166, 0],
    [18, 36, 76, 89, 113, 114, 143],
    [19, 38, 77, 104, 116, 163, 0],
    [20, 47, 70, 92, 138, 165, 0],
    [2, 48, 74, 113, 128, 160, 0],
    [21, 45, 78, 83, 117, 121, 151],
    [22, 47, 58, 118, 127, 164, 0],
    [16, 39, 62, 112, 134, 158, 0],
    [23, 43, 79, 120, 131, 145, 0],
    [19, 35, 59, 73, 110, 125, 161],
    [20, 36, 63, 94, 136, 161, 0],
    [14, 31, 79, 98, 132, 164, 0],
    [3, 44, 80, 124, 127, 169, 0],
    [19, 46, 81, 117, 135, 167, 0],
    [7, 49, 58, 90, 100, 105, 168],
    [12, 50, 61, 118, 119, 144, 0],
    [13, 51, 64, 114, 118, 157, 0],
    [24, 52, 76, 129, 148, 149, 0],
    [25, 53, 69, 90, 101, 130, 156],
    [20, 46, 65, 80, 120, 140, 170],
    [21, 54, 77, 100, 140, 171, 0],
    [35, 82, 133, 142, 171, 174, 0],
    [14, 30, 83, 113, 125, 170, 0],
    [4, 29, 68, 120, 134, 173, 0],
    [1, 4, 52, 57, 86, 136, 152],
    [26, 51, 56, 91, 122, 137, 168],
    [52, 84, 110, 115, 145, 168, 0],
    [7, 50, 81, 99, 132, 173, 0],
    [23, 55, 67, 95, 172, 174, 0],
    [26, 41, 77, 109, 141, 148, 0],
    [2, 27, 41, 61, 62, 115, 133],
    [27, 40, 56, 124, 125, 126, 0],
    [18, 49, 55, 124, 141, 167, 0],
    [6, 33, 85, 108, 116, 156, 0],
    [28, 48, 70, 85, 105, 129, 158],
    [9, 54, 63, 131, 147, 155, 0],
    [22, 53, 68, 109, 121, 174, 0],
    [3, 13, 48, 78, 95, 123, 0],
    [31, 69, 133, 150, 155, 169, 0],
    [12, 43, 66, 89, 97, 135, 159],
    [5, 39, 75, 102, 136, 167, 0],
    [2, 54, 86, 101, 135, 164, 0],
    [15, 56, 87, 108, 119, 171, 0],
    [10, 44, 82, 91, 111, 144, 149],
    [23, 34, 71, 94, 127, 153, 0],
    [11, 49, 88, 92, 142, 157, 0],
    [29, 34, 87, 97, 147, 162, 0],
    [30, 50, 60, 86, 137, 142, 162],
    [10, 53, 66, 84, 112, 128, 165],
    [22, 57, 85, 93, 140, 159, 0],
    [28, 32, 72, 103, 132, 166, 0],
    [28, 29, 84, 88, 117, 143, 150],
    [1, 26, 45, 80, 128, 147, 0],
    [17, 27, 89, 103, 116, 153, 0],
    [51, 57, 98, 163, 165, 172, 0],
    [21, 37, 73, 138, 152, 169, 0],
    [16, 47, 76, 130, 137, 154, 0],
    [3, 24, 30, 72, 104, 139, 0],
    [9, 40, 90, 106, 134, 151, 0],
    [15, 58, 60, 74, 111, 150, 163],
    [18, 42, 79, 144, 146, 152, 0],
    [25, 38, 65, 99, 122, 160, 0],
    [17, 42, 75, 129, 170, 172, 0],
];

/// Generator rows: 91-bit masks over the systematic word, one per parity
/// bit. Stored as the published hex rows with the unused trailing bit
/// dropped.
pub const GENERATOR: [u128; M] = [
    0x8329ce11bf31eaf509f27fc >> 1,
    0x761c264e25c259335493132 >> 1,
    0xdc265902fb277c6410a1bdc >> 1,
    0x1b3f417858cd2dd33ec7f62 >> 1,
    0x09fda4fee04195fd034783a >> 1,
    0x077cccc11b8873ed5c3d48a >> 1,
    0x29b62afe3ca036f4fe1a9da >> 1,
    0x6054faf5f35d96d3b0c8c3e >> 1,
    0xe20798e4310eed27884ae90 >> 1,
    0x775c9c08e80e26ddae56318 >> 1,
    0xb0b811028c2bf997213487c >> 1,
    0x18a0c9231fc60adf5c5ea32 >> 1,
    0x76471e8302a0721e01b12b8 >> 1,
    0xffbccb80ca8341fafb47b2e >> 1,
    0x66a72a158f9325a2bf67170 >> 1,
    0xc4243689fe85b1c51363a18 >> 1,
    0x0dff739414d1a1b34b1c270 >> 1,
    0x15b48830636c8b99894972e >> 1,
    0x29a89c0d3de81d665489b0e >> 1,
    0x4f126f37fa51cbe61bd6b94 >> 1,
    0x99c47239d0d97d3c84e0940 >> 1,
    0x1919b75119765621bb4f1e8 >> 1,
    0x09db12d731faee0b86df6b8 >> 1,
    0x488fc33df43fbdeea4eafb4 >> 1,
    0x827423ee40b675f756eb5fe >> 1,
    0xabe197c484cb74757144a9a >> 1,
    0x2b500e4bc0ec5a6d2bdbdd0 >> 1,
    0xc474aa53d70218761669360 >> 1,
    0x8eba1a13db3390bd6718cec >> 1,
    0x753844673a27782cc42012e >> 1,
    0x06ff83a145c37035a5c1268 >> 1,
    0x3b37417858cc2dd33ec3f62 >> 1,
    0x9a4a5a28ee17ca9c324842c >> 1,
    0xbc29f465309c977e89610a4 >> 1,
    0x2663ae6ddf8b5ce2bb29488 >> 1,
    0x46f231efe457034c1814418 >> 1,
    0x3fb2ce85abe9b0c72e06fbe >> 1,
    0xde87481f282c153971a0a2e >> 1,
    0xfcd7ccf23c69fa99bba1412 >> 1,
    0xf0261447e9490ca8e474cec >> 1,
    0x4410115818196f95cdd7012 >> 1,
    0x088fc31df4bfbde2a4eafb4 >> 1,
    0xb8fef1b6307729fb0a078c0 >> 1,
    0x5afea7acccb77bbc9d99a90 >> 1,
    0x49a7016ac653f65ecdc9076 >> 1,
    0x1944d085be4e7da8d6cc7d0 >> 1,
    0x251f62adc4032f0ee714002 >> 1,
    0x56471f8702a0721e00b12b8 >> 1,
    0x2b8e4923f2dd51e2d537fa0 >> 1,
    0x6b550a40a66f4755de95c26 >> 1,
    0xa18ad28d4e27fe92a4f6c84 >> 1,
    0x10c2e586388cb82a3d80758 >> 1,
    0xef34a41817ee02133db2eb0 >> 1,
    0x7e9c0c54325a9c15836e000 >> 1,
    0x3693e572d1fde4cdf079e86 >> 1,
    0xbfb2cec5abe1b0c72e07fbe >> 1,
    0x7ee18230c583cccc57d4b08 >> 1,
    0xa066cb2fedafc9f52664126 >> 1,
    0xbb23725abc47cc5f4cc4cd2 >> 1,
    0xded9dba3bee40c59b5609b4 >> 1,
    0xd9a7016ac653e6decdc9036 >> 1,
    0x9ad46aed5f707f280ab5fc4 >> 1,
    0xe5921c77822587316d7d3c2 >> 1,
    0x4f14da8242a8b86dca73352 >> 1,
    0x8b8b507ad467d4441df770e >> 1,
    0x22831c9cf1169467ad04b68 >> 1,
    0x213b838fe2ae54c38ee7180 >> 1,
    0x5d926b6dd71f085181a4e12 >> 1,
    0x66ab79d4b29ee6e69509e56 >> 1,
    0x958148682d748a38dd68baa >> 1,
    0xb8ce020cf069c32a723ab14 >> 1,
    0xf4331d6d461607e95752746 >> 1,
    0x6da23ba424b9596133cf9c8 >> 1,
    0xa636bcbc7b30c5fbeae67fe >> 1,
    0x5cb0d86a07df654a9089a20 >> 1,
    0xf11f106848780fc9ecdd80a >> 1,
    0x1fbb5364fb8d2c9d730d5ba >> 1,
    0xfcb86bc70a50c9d02a5d034 >> 1,
    0xa534433029eac15f322e34c >> 1,
    0xc989d9c7c3d3b8c55d75130 >> 1,
    0x7bb38b2f0186d46643ae962 >> 1,
    0x2644ebadeb44b9467d1f42c >> 1,
    0x608cc857594bfbb55d69600 >> 1,
];

/// 0-based parity-check adjacency derived from `NM`.
pub struct Adjacency {
    /// Variables per check row.
    pub nrw: [usize; M],
    /// Check row -> variable indices.
    pub nm: [[usize; MAX_NRW]; M],
    /// Variable -> the three checks it participates in.
    pub mn: [[usize; NCW]; N],
}

pub static ADJ: Lazy<Adjacency> = Lazy::new(|| {
    let mut adj = Adjacency {
        nrw: [0; M],
        nm: [[0; MAX_NRW]; M],
        mn: [[0; NCW]; N],
    };
    let mut seen = [0usize; N];
    for (j, row) in NM.iter().enumerate() {
        for &v in row.iter().filter(|&&v| v != 0) {
            let v = v as usize - 1;
            adj.nm[j][adj.nrw[j]] = v;
            adj.nrw[j] += 1;
            adj.mn[v][seen[v]] = j;
            seen[v] += 1;
        }
    }
    debug_assert!(seen.iter().all(|&c| c == NCW));
    adj
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variable_sits_in_three_checks() {
        let mut count = [0usize; N];
        for row in NM.iter() {
            for &v in row.iter().filter(|&&v| v != 0) {
                count[v as usize - 1] += 1;
            }
        }
        assert!(count.iter().all(|&c| c == NCW));
    }

    #[test]
    fn check_rows_have_six_or_seven_variables() {
        for (j, &len) in ADJ.nrw.iter().enumerate() {
            assert!(len == 6 || len == 7, "check {j} has {len} variables");
        }
    }

    #[test]
    fn adjacency_maps_are_mutually_consistent() {
        for v in 0..N {
            for &j in ADJ.mn[v].iter() {
                assert!(ADJ.nm[j][..ADJ.nrw[j]].contains(&v));
            }
        }
    }
}
