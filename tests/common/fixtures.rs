use serde::Serialize;

pub const MAGNET_INFO_HASH: &str = "9c38422213e30bff212b30c360d26f9a02136422";

#[derive(Serialize)]
struct Info {
    length: u64,
    name: String,
    #[serde(rename = "piece length")]
    piece_length: u64,
    #[serde(with = "serde_bytes")]
    pieces: Vec<u8>,
}

#[derive(Serialize)]
struct Torrent {
    announce: String,
    info: Info,
}

/// A bencoded single file `.torrent` descriptor.
pub fn descriptor(name: &str, length: u64) -> Vec<u8> {
    let torrent = Torrent {
        announce: "http://tracker.example.com/announce".to_owned(),
        info: Info {
            length,
            name: name.to_owned(),
            piece_length: 256 * 1024,
            pieces: vec![42u8; 20],
        },
    };

    serde_bencode::to_bytes(&torrent).expect("the descriptor fixture should be encodable")
}

pub fn magnet_link() -> String {
    format!("magnet:?xt=urn:btih:{MAGNET_INFO_HASH}&dn=ubuntu-24.04.iso")
}
