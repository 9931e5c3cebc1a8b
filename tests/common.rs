#![allow(unused)]
use bdk_sweep::bitcoin::hashes::Hash;
use bdk_sweep::bitcoin::{Amount, FeeRate, OutPoint, ScriptBuf, TxOut, Txid};
use bdk_sweep::wallet::MemoryWallet;
use bdk_sweep::{AddressType, Params, SpendableInput, SweeperInput, WalletUtxo, WitnessType};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn get_test_outpoint(n: u8) -> OutPoint {
    OutPoint {
        txid: Txid::from_byte_array([n; 32]),
        vout: 0,
    }
}

pub fn get_test_script(address_type: AddressType) -> ScriptBuf {
    let bytes = match address_type {
        AddressType::TaprootPubkey => [&[0x51, 0x20][..], &[0x01; 32][..]].concat(),
        // OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG
        AddressType::PubKeyHash => [&[0x76, 0xa9, 0x14][..], &[0x02; 20][..], &[0x88, 0xac][..]]
            .concat(),
        _ => [&[0x00, 0x14][..], &[0x03; 20][..]].concat(),
    };
    ScriptBuf::from_bytes(bytes)
}

pub fn get_test_p2wsh_script() -> ScriptBuf {
    ScriptBuf::from_bytes([&[0x00, 0x20][..], &[0x04; 32][..]].concat())
}

pub fn get_test_input(n: u8, value: u64, witness_type: WitnessType) -> SpendableInput {
    SpendableInput::new(
        get_test_outpoint(n),
        TxOut {
            value: Amount::from_sat(value),
            script_pubkey: get_test_script(AddressType::WitnessPubKey),
        },
        witness_type,
    )
}

/// Second level HTLC success input paying `required` to a P2WSH output
pub fn get_test_htlc_input(n: u8, value: u64, required: u64) -> SpendableInput {
    get_test_input(n, value, WitnessType::HtlcSecondLevelSuccessAnchor).with_required_output(
        TxOut {
            value: Amount::from_sat(required),
            script_pubkey: get_test_p2wsh_script(),
        },
    )
}

pub fn get_test_sweeper_input(
    input: SpendableInput,
    budget: u64,
    deadline_height: Option<u32>,
) -> SweeperInput {
    SweeperInput::new(
        input,
        Params {
            budget: Amount::from_sat(budget),
            deadline_height,
            ..Default::default()
        },
    )
}

/// Return a wallet holding one confirmed UTXO per value
pub fn get_funded_wallet(values: &[u64], address_type: AddressType) -> MemoryWallet {
    let mut wallet = MemoryWallet::new();
    for (i, value) in values.iter().enumerate() {
        let utxo = WalletUtxo {
            outpoint: get_test_outpoint(200 + i as u8),
            txout: TxOut {
                value: Amount::from_sat(*value),
                script_pubkey: get_test_script(address_type),
            },
            address_type,
        };
        wallet.insert_utxo(utxo, 6);
    }

    wallet
}

pub fn feerate_unchecked(sat_vb: f64) -> FeeRate {
    // 1 sat_vb / 4wu_vb * 1000kwu_wu = 250 sat_kwu
    let sat_kwu = (sat_vb * 250.0).ceil() as u64;
    FeeRate::from_sat_per_kwu(sat_kwu)
}
