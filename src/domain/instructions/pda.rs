//! Program-derived addresses of the token metadata program.
use solana_sdk::pubkey::Pubkey;

use crate::constants::{EDITION_SEED_SUFFIX, METADATA_SEED_PREFIX};

/// Metadata account of `mint`: seeds `["metadata", program, mint]`.
pub fn find_metadata_address(token_metadata_program: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            METADATA_SEED_PREFIX,
            token_metadata_program.as_ref(),
            mint.as_ref(),
        ],
        token_metadata_program,
    )
}

/// Master edition account of `mint`: seeds `["metadata", program, mint, "edition"]`.
pub fn find_master_edition_address(
    token_metadata_program: &Pubkey,
    mint: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            METADATA_SEED_PREFIX,
            token_metadata_program.as_ref(),
            mint.as_ref(),
            EDITION_SEED_SUFFIX,
        ],
        token_metadata_program,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProgramAddresses;

    #[test]
    fn test_addresses_are_distinct_program_addresses() {
        let programs = ProgramAddresses::default();
        let mint = Pubkey::new_unique();

        let (metadata, bump) = find_metadata_address(&programs.token_metadata_program, &mint);
        let (edition, _) = find_master_edition_address(&programs.token_metadata_program, &mint);

        assert_eq!(
            find_metadata_address(&programs.token_metadata_program, &mint),
            (metadata, bump)
        );
        assert_ne!(metadata, edition);
        assert!(!metadata.is_on_curve());
        assert!(!edition.is_on_curve());
    }

    #[test]
    fn test_depends_on_program_id() {
        let mint = Pubkey::new_unique();
        let (mainnet, _) =
            find_metadata_address(&ProgramAddresses::default().token_metadata_program, &mint);
        let (custom, _) = find_metadata_address(&Pubkey::new_unique(), &mint);

        assert_ne!(mainnet, custom);
    }
}
