use std::collections::HashMap;

use anyhow::{Context, Result};
use ethers::types::{I256, U256};

use crate::types::{Holder, TransferRecord};

/// Mint/burn sentinel; never accounted as a holder.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Replay transfers as signed deltas into an address-keyed ledger. Keys are
/// lowercased so mixed-case records land on one entry; empty and sentinel
/// address fields are skipped, so supply changes never appear as holdings.
pub fn build_ledger(transfers: &[TransferRecord]) -> Result<HashMap<String, I256>> {
    let mut ledger: HashMap<String, I256> = HashMap::new();
    for t in transfers {
        let from = t.from.to_lowercase();
        let to = t.to.to_lowercase();
        let raw = U256::from_dec_str(&t.value)
            .with_context(|| format!("bad transfer value {:?} in tx {}", t.value, t.hash))?;
        let value = I256::try_from(raw)
            .with_context(|| format!("transfer value out of range in tx {}", t.hash))?;
        if !from.is_empty() && from != ZERO_ADDRESS {
            let entry = ledger.entry(from).or_insert_with(I256::zero);
            *entry = entry.checked_sub(value).context("ledger underflow")?;
        }
        if !to.is_empty() && to != ZERO_ADDRESS {
            let entry = ledger.entry(to).or_insert_with(I256::zero);
            *entry = entry.checked_add(value).context("ledger overflow")?;
        }
    }
    Ok(ledger)
}

/// Non-zero holders scaled by the token's decimals, sorted descending by
/// balance with ties broken by address ascending so output is reproducible.
pub fn rank_holders(ledger: &HashMap<String, I256>, decimals: u8) -> Vec<Holder> {
    let mut holders: Vec<Holder> = ledger
        .iter()
        .filter(|(_, bal)| !bal.is_zero())
        .map(|(addr, bal)| Holder {
            address: addr.clone(),
            balance: to_decimal(*bal, decimals),
        })
        .collect();
    holders.sort_by(|a, b| {
        b.balance
            .total_cmp(&a.balance)
            .then_with(|| a.address.cmp(&b.address))
    });
    holders
}

/// Top-N is a plain head-slice of the full ranking.
pub fn top_holders(holders: &[Holder], n: usize) -> &[Holder] {
    &holders[..holders.len().min(n)]
}

fn to_decimal(value: I256, decimals: u8) -> f64 {
    let abs = value.unsigned_abs();
    let hi = (abs >> 128).low_u128() as f64;
    let lo = (abs & U256::from(u128::MAX)).low_u128() as f64;
    let raw = hi * 2f64.powi(128) + lo;
    let scaled = raw / 10f64.powi(decimals as i32);
    if value.is_negative() {
        -scaled
    } else {
        scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const C: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

    fn transfer(from: &str, to: &str, value: &str) -> TransferRecord {
        TransferRecord {
            block_number: "1".into(),
            hash: "0xabc".into(),
            from: from.into(),
            to: to.into(),
            value: value.into(),
        }
    }

    #[test]
    fn mint_then_transfer() {
        let txs = vec![transfer(ZERO_ADDRESS, A, "100"), transfer(A, B, "40")];
        let ledger = build_ledger(&txs).unwrap();
        assert_eq!(ledger.get(A), Some(&I256::from(60)));
        assert_eq!(ledger.get(B), Some(&I256::from(40)));
        assert!(!ledger.contains_key(ZERO_ADDRESS));
    }

    #[test]
    fn deltas_sum_to_zero_without_mints() {
        let txs = vec![
            transfer(A, B, "70"),
            transfer(B, C, "25"),
            transfer(C, A, "5"),
        ];
        let ledger = build_ledger(&txs).unwrap();
        let sum = ledger.values().fold(I256::zero(), |acc, v| acc + *v);
        assert_eq!(sum, I256::zero());
    }

    #[test]
    fn mint_breaks_the_zero_sum() {
        let txs = vec![transfer(ZERO_ADDRESS, A, "100"), transfer(A, B, "40")];
        let ledger = build_ledger(&txs).unwrap();
        let sum = ledger.values().fold(I256::zero(), |acc, v| acc + *v);
        assert_eq!(sum, I256::from(100));
    }

    #[test]
    fn self_transfer_is_neutral() {
        let txs = vec![transfer(ZERO_ADDRESS, A, "10"), transfer(A, A, "7")];
        let ledger = build_ledger(&txs).unwrap();
        assert_eq!(ledger.get(A), Some(&I256::from(10)));
    }

    #[test]
    fn mixed_case_addresses_share_one_entry() {
        let upper = format!("0x{}", A[2..].to_uppercase());
        let txs = vec![transfer(ZERO_ADDRESS, A, "10"), transfer(ZERO_ADDRESS, &upper, "5")];
        let ledger = build_ledger(&txs).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(A), Some(&I256::from(15)));
    }

    #[test]
    fn negative_window_flow_is_kept() {
        // A window can open after an address already held tokens.
        let txs = vec![transfer(A, B, "30")];
        let ledger = build_ledger(&txs).unwrap();
        assert_eq!(ledger.get(A), Some(&I256::from(-30)));
    }

    #[test]
    fn zero_balance_addresses_are_dropped() {
        let txs = vec![transfer(ZERO_ADDRESS, A, "50"), transfer(A, B, "50")];
        let ledger = build_ledger(&txs).unwrap();
        let holders = rank_holders(&ledger, 0);
        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0].address, B);
    }

    #[test]
    fn ranks_descending_with_address_tiebreak() {
        let mut ledger = HashMap::new();
        ledger.insert(B.to_string(), I256::from(5));
        ledger.insert(C.to_string(), I256::from(9));
        ledger.insert(A.to_string(), I256::from(5));
        let holders = rank_holders(&ledger, 0);
        let addrs: Vec<_> = holders.iter().map(|h| h.address.as_str()).collect();
        assert_eq!(addrs, vec![C, A, B]);
    }

    #[test]
    fn scales_by_decimals() {
        let mut ledger = HashMap::new();
        ledger.insert(A.to_string(), I256::from(1_500_000));
        let holders = rank_holders(&ledger, 6);
        assert!((holders[0].balance - 1.5).abs() < 1e-9);
    }

    #[test]
    fn top_n_is_a_head_slice_of_the_full_ranking() {
        let mut ledger = HashMap::new();
        for i in 0..25u64 {
            ledger.insert(format!("0x{:040x}", i + 1), I256::from(1000 - i as i64));
        }
        let holders = rank_holders(&ledger, 0);
        let top = top_holders(&holders, 20);
        assert_eq!(top.len(), 20);
        assert_eq!(top, &holders[..20]);
        assert!(top.windows(2).all(|w| w[0].balance >= w[1].balance));
    }

    #[test]
    fn top_n_larger_than_table_returns_everything() {
        let mut ledger = HashMap::new();
        ledger.insert(A.to_string(), I256::from(3));
        let holders = rank_holders(&ledger, 0);
        assert_eq!(top_holders(&holders, 20).len(), 1);
    }
}
