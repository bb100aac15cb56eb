// Wire types: address / hash text form, JSON shapes and error conversion.

#[cfg(test)]
mod tests {
    use confidential_core::crypto::{decrypt, SymmetricKey};
    use confidential_core::headers::{write_deploy_header, DeployHeader};
    use confidential_core::transform::{CompletedTransaction, Log, TransactionRequest};
    use confidential_core::types::{Address, Error, ParseError, TxHash};
    use serde_json::json;

    #[test]
    fn address_parses_with_and_without_prefix() {
        let a: Address = "0x00000000000000000000000000000000000000ff".parse().unwrap();
        let b: Address = "00000000000000000000000000000000000000FF".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0x00000000000000000000000000000000000000ff");
        assert_eq!(a.as_bytes()[19], 0xff);
    }

    #[test]
    fn address_rejects_wrong_length() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert!(matches!(err, ParseError::InvalidHex { kind: "address", .. }));
        assert!("0xzz".parse::<TxHash>().is_err());
    }

    #[test]
    fn completed_transaction_json_shape() {
        let event = CompletedTransaction { transaction_hash: TxHash([0xab; 32]), return_data: vec![1, 2] };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["returnData"], json!("0x0102"));
        assert_eq!(value["transactionHash"], json!(format!("0x{}", "ab".repeat(32))));

        let back: CompletedTransaction = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn log_topics_default_to_empty() {
        let log: Log = serde_json::from_value(json!({
            "address": format!("0x{}", "11".repeat(20)),
            "data": "0x",
        }))
        .unwrap();
        assert!(log.topics.is_empty());
        assert!(log.data.is_empty());
    }

    #[test]
    fn transaction_request_omits_unset_fields() {
        let tx = TransactionRequest { to: None, data: "0x60".into(), header: None };
        assert_eq!(serde_json::to_value(&tx).unwrap(), json!({ "data": "0x60" }));
    }

    fn stamp_then_open(bytecode: &str) -> Result<Vec<u8>, Error> {
        write_deploy_header(&DeployHeader::default().with_expiry(1), bytecode)?;
        let key = SymmetricKey::new([0u8; 48]);
        Ok(decrypt(&key, b"", &[0u8; 16], b"")?)
    }

    #[test]
    fn module_errors_convert_into_crate_error() {
        assert!(matches!(stamp_then_open(""), Err(Error::Header(_))));
        assert!(matches!(stamp_then_open("0x60"), Err(Error::Crypto(_))));
    }
}
