// Confidential transform suite: pass-through vs decrypt, failure surfacing, all-or-nothing
// batches and the decrypting stream adapters.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use confidential_core::crypto::{LocalKeyManager, SymmetricKey};
    use confidential_core::headers::DeployHeader;
    use confidential_core::invoke::StreamMessage;
    use confidential_core::transform::{
        decrypting_completed_transactions, decrypting_logs, CompletedTransaction, ConfidentialTransform,
        ConfidentialityOracle, KeyManager, Log, TransactionRequest, TransformError,
    };
    use confidential_core::types::{Address, TxHash};
    use confidential_core::utils::{decode_hex, encode_hex};
    use futures::executor::block_on;
    use futures::stream::{self, StreamExt};

    const SECRET: Address = Address([0xC0; 20]);
    const PLAIN: Address = Address([0x11; 20]);

    /// Oracle with a fixed confidential set that fails its first `fail_first` calls.
    struct TestOracle {
        confidential: HashSet<Address>,
        fail_first: usize,
        calls: AtomicUsize,
    }

    impl TestOracle {
        fn new(fail_first: usize) -> Self {
            Self { confidential: HashSet::from([SECRET]), fail_first, calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConfidentialityOracle for TestOracle {
        async fn is_confidential(&self, address: &Address) -> anyhow::Result<bool> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err(anyhow!("node unreachable"));
            }
            Ok(self.confidential.contains(address))
        }
    }

    fn key_manager() -> Arc<LocalKeyManager> {
        Arc::new(LocalKeyManager::new(&SymmetricKey::new([0x42; 48])).unwrap())
    }

    fn setup(fail_first: usize) -> (ConfidentialTransform, Arc<TestOracle>, Arc<LocalKeyManager>) {
        let oracle = Arc::new(TestOracle::new(fail_first));
        let km = key_manager();
        (ConfidentialTransform::new(oracle.clone(), km.clone()), oracle, km)
    }

    fn completed(byte: u8, return_data: Vec<u8>) -> CompletedTransaction {
        CompletedTransaction { transaction_hash: TxHash([byte; 32]), return_data }
    }

    // ## 1️⃣ Return data

    #[test]
    fn plain_return_passes_through() {
        let (transform, _, _) = setup(0);
        let out = block_on(transform.resolve_return(&PLAIN, completed(1, b"raw".to_vec()))).unwrap();
        assert_eq!(out, b"raw");
    }

    #[test]
    fn confidential_return_is_decrypted() {
        let (transform, _, km) = setup(0);
        let sealed = km.seal_envelope(b"secret result").unwrap();
        let out = block_on(transform.resolve_return(&SECRET, completed(1, sealed))).unwrap();
        assert_eq!(out, b"secret result");
    }

    #[test]
    fn oracle_failure_is_surfaced() {
        let (transform, _, _) = setup(1);
        let err = block_on(transform.resolve_return(&PLAIN, completed(1, b"raw".to_vec()))).unwrap_err();
        match err {
            TransformError::Oracle { address, reason } => {
                assert_eq!(address, PLAIN);
                assert!(reason.contains("node unreachable"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decryption_failure_is_surfaced() {
        let (transform, _, _) = setup(0);
        let err = block_on(transform.resolve_return(&SECRET, completed(1, vec![0u8; 40]))).unwrap_err();
        assert!(matches!(err, TransformError::Decryption { field: "returnData", .. }));
    }

    #[test]
    fn shared_key_manager_serves_both_roles() {
        let km = Arc::new(
            LocalKeyManager::new(&SymmetricKey::new([0x42; 48])).unwrap().with_confidential(SECRET),
        );
        let transform = ConfidentialTransform::from_shared(km.clone());
        let sealed = km.seal_envelope(b"hi").unwrap();
        assert_eq!(block_on(transform.resolve_return(&SECRET, completed(1, sealed))).unwrap(), b"hi");
    }

    // ## 2️⃣ Outgoing transactions

    #[test]
    fn call_to_confidential_contract_is_encrypted() {
        let (transform, _, km) = setup(0);
        let tx = TransactionRequest { to: Some(SECRET), data: "0xa9059cbb".into(), header: None };
        let prepared = block_on(transform.prepare_transaction(tx)).unwrap();
        assert_ne!(prepared.data, "0xa9059cbb");

        let envelope = decode_hex(&prepared.data).unwrap();
        let plain = block_on(km.decrypt(&envelope)).unwrap();
        assert_eq!(encode_hex(&plain), "0xa9059cbb");
    }

    #[test]
    fn call_to_plain_contract_is_untouched() {
        let (transform, _, _) = setup(0);
        let tx = TransactionRequest { to: Some(PLAIN), data: "0xa9059cbb".into(), header: None };
        let prepared = block_on(transform.prepare_transaction(tx.clone())).unwrap();
        assert_eq!(prepared, tx);
    }

    #[test]
    fn call_with_bad_hex_fails() {
        let (transform, _, _) = setup(0);
        let tx = TransactionRequest { to: Some(PLAIN), data: "0xzz".into(), header: None };
        let err = block_on(transform.prepare_transaction(tx)).unwrap_err();
        assert!(matches!(err, TransformError::InvalidHex(_)));
    }

    #[test]
    fn deployment_gets_header_stamped() {
        let (transform, oracle, _) = setup(0);
        let tx = TransactionRequest {
            to: None,
            data: "0x6080".into(),
            header: Some(DeployHeader::default().with_confidential(true)),
        };
        let prepared = block_on(transform.prepare_transaction(tx)).unwrap();
        assert_eq!(prepared.data, r#"0x0073697300010015{"confidential":true}6080"#);
        assert_eq!(prepared.header, None);
        assert_eq!(oracle.calls(), 0);
    }

    #[test]
    fn deployment_header_errors_propagate() {
        let (transform, _, _) = setup(0);
        let tx = TransactionRequest {
            to: None,
            data: "0x".into(),
            header: Some(DeployHeader::default().with_expiry(1)),
        };
        let err = block_on(transform.prepare_transaction(tx)).unwrap_err();
        assert!(matches!(err, TransformError::Header(_)));
    }

    // ## 3️⃣ Logs

    #[test]
    fn log_batch_decrypts_only_confidential_entries() {
        let (transform, oracle, km) = setup(0);
        let logs = vec![
            Log { address: SECRET, topics: vec![], data: km.seal_envelope(b"one").unwrap() },
            Log { address: PLAIN, topics: vec![TxHash([7; 32])], data: b"two".to_vec() },
            Log { address: SECRET, topics: vec![], data: km.seal_envelope(b"three").unwrap() },
        ];
        let out = block_on(transform.decrypt_logs(logs)).unwrap();
        let data: Vec<&[u8]> = out.iter().map(|l| l.data.as_slice()).collect();
        assert_eq!(data, vec![&b"one"[..], &b"two"[..], &b"three"[..]]);
        assert_eq!(out[1].topics, vec![TxHash([7; 32])]);
        // One oracle query per distinct address.
        assert_eq!(oracle.calls(), 2);
    }

    #[test]
    fn log_batch_is_all_or_nothing() {
        let (transform, _, km) = setup(0);
        let logs = vec![
            Log { address: SECRET, topics: vec![], data: km.seal_envelope(b"good").unwrap() },
            Log { address: SECRET, topics: vec![], data: vec![1, 2, 3] },
        ];
        let err = block_on(transform.decrypt_logs(logs)).unwrap_err();
        assert!(matches!(err, TransformError::Decryption { field: "log data", .. }));
    }

    #[test]
    fn log_batch_fails_on_oracle_error() {
        let (transform, _, _) = setup(1);
        let logs = vec![Log { address: PLAIN, topics: vec![], data: b"x".to_vec() }];
        assert!(matches!(
            block_on(transform.decrypt_logs(logs)).unwrap_err(),
            TransformError::Oracle { .. }
        ));
    }

    // ## 4️⃣ Stream adapters

    #[test]
    fn completed_stream_decrypts_and_caches_confidentiality() {
        let (transform, oracle, km) = setup(0);
        let inner = stream::iter(vec![
            StreamMessage::Data(completed(1, km.seal_envelope(b"a").unwrap())),
            StreamMessage::Data(completed(2, km.seal_envelope(b"b").unwrap())),
        ])
        .boxed();

        let out: Vec<_> = block_on(decrypting_completed_transactions(transform, inner, Some(SECRET)).collect());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap().return_data, b"a");
        assert_eq!(out[1].as_ref().unwrap().return_data, b"b");
        assert_eq!(oracle.calls(), 1);
    }

    #[test]
    fn completed_stream_retries_after_oracle_failure() {
        let (transform, oracle, km) = setup(1);
        let inner = stream::iter(vec![
            StreamMessage::Data(completed(1, km.seal_envelope(b"a").unwrap())),
            StreamMessage::Data(completed(2, km.seal_envelope(b"b").unwrap())),
        ])
        .boxed();

        let out: Vec<_> = block_on(decrypting_completed_transactions(transform, inner, Some(SECRET)).collect());
        assert!(matches!(out[0], Err(TransformError::Oracle { .. })));
        assert_eq!(out[1].as_ref().unwrap().return_data, b"b");
        assert_eq!(oracle.calls(), 2);
    }

    #[test]
    fn completed_stream_without_address_passes_through() {
        let (transform, oracle, _) = setup(0);
        let inner = stream::iter(vec![
            StreamMessage::Data(completed(1, b"raw".to_vec())),
            StreamMessage::Error(anyhow!("socket reset")),
        ])
        .boxed();

        let out: Vec<_> = block_on(decrypting_completed_transactions(transform, inner, None).collect());
        assert_eq!(out[0].as_ref().unwrap().return_data, b"raw");
        match &out[1] {
            Err(TransformError::Upstream(cause)) => assert!(cause.contains("socket reset")),
            other => panic!("unexpected item: {other:?}"),
        }
        assert_eq!(oracle.calls(), 0);
    }

    #[test]
    fn log_stream_decrypts_each_entry() {
        let (transform, _, km) = setup(0);
        let inner = stream::iter(vec![
            Log { address: SECRET, topics: vec![], data: km.seal_envelope(b"x").unwrap() },
            Log { address: PLAIN, topics: vec![], data: b"y".to_vec() },
        ])
        .boxed();

        let out: Vec<_> = block_on(decrypting_logs(transform, inner).collect());
        assert_eq!(out[0].as_ref().unwrap().data, b"x");
        assert_eq!(out[1].as_ref().unwrap().data, b"y");
    }
}
