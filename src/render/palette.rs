//! Fixed colour palette, indexed by rank.

use image::Rgb;

/// matplotlib's `tab20c` colour map.
pub const TAB20C: [[u8; 3]; 20] = [
    [0x31, 0x82, 0xbd],
    [0x6b, 0xae, 0xd6],
    [0x9e, 0xca, 0xe1],
    [0xc6, 0xdb, 0xef],
    [0xe6, 0x55, 0x0d],
    [0xfd, 0x8d, 0x3c],
    [0xfd, 0xae, 0x6b],
    [0xfd, 0xd0, 0xa2],
    [0x31, 0xa3, 0x54],
    [0x74, 0xc4, 0x76],
    [0xa1, 0xd9, 0x9b],
    [0xc7, 0xe9, 0xc0],
    [0x75, 0x6b, 0xb1],
    [0x9e, 0x9a, 0xc8],
    [0xbc, 0xbd, 0xdc],
    [0xda, 0xda, 0xeb],
    [0x63, 0x63, 0x63],
    [0x96, 0x96, 0x96],
    [0xbd, 0xbd, 0xbd],
    [0xd9, 0xd9, 0xd9],
];

/// Colour for the term at `rank` (0-based); cycles through [`TAB20C`].
pub fn color_for_rank(rank: usize) -> Rgb<u8> {
    Rgb(TAB20C[rank % TAB20C.len()])
}
