#![no_main]

use libfuzzer_sys::fuzz_target;
use solana_nft_minter::domain::instructions::decode_create_master_edition_v3_data;

fuzz_target!(|data: &[u8]| {
    if let Ok(args) = decode_create_master_edition_v3_data(data) {
        // re-encoding may only differ in the value slot of an absent max supply
        let encoded = args.data();
        assert_eq!(encoded.len(), data.len());
        assert_eq!(encoded[..2], data[..2]);
        if args.max_supply.is_some() {
            assert_eq!(encoded, data);
        }
    }
});
