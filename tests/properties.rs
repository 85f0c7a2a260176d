use ethers::types::{Address, H256, U256};
use proptest::prelude::*;
use sol_interface::{Args, Event, LogEntry, LogValue, ParamType, Signature, Token};

fn uint_token() -> impl Strategy<Value = Token> {
    any::<[u8; 32]>().prop_map(|bytes| Token::Uint(U256::from_big_endian(&bytes)))
}

fn address_token() -> impl Strategy<Value = Token> {
    any::<[u8; 20]>().prop_map(|bytes| Token::Address(Address::from(bytes)))
}

fn value() -> impl Strategy<Value = (ParamType, Token)> {
    prop_oneof![
        uint_token().prop_map(|t| (ParamType::Uint(256), t)),
        address_token().prop_map(|t| (ParamType::Address, t)),
        any::<bool>().prop_map(|b| (ParamType::Bool, Token::Bool(b))),
        ".{0,40}".prop_map(|s| (ParamType::String, Token::String(s))),
        proptest::collection::vec(any::<u8>(), 0..70).prop_map(|b| (ParamType::Bytes, Token::Bytes(b))),
        proptest::collection::vec(uint_token(), 0..4)
            .prop_map(|items| (ParamType::Array(Box::new(ParamType::Uint(256))), Token::Array(items))),
    ]
}

proptest! {
    #[test]
    fn signature_round_trip(values in proptest::collection::vec(value(), 0..6)) {
        let (kinds, tokens): (Vec<_>, Vec<_>) = values.into_iter().unzip();
        let signature = Signature::positional(kinds);
        let encoded = signature.encode(&Args::positional(tokens.clone())).unwrap();
        prop_assert_eq!(signature.decode(&encoded).unwrap(), tokens);
    }

    #[test]
    fn named_signature_accepts_any_argument_order(values in proptest::collection::vec(value(), 1..6)) {
        let named: Vec<(String, ParamType)> =
            values.iter().enumerate().map(|(i, (kind, _))| (format!("p{i}"), kind.clone())).collect();
        let signature = Signature::named(named).unwrap();

        let in_order = values
            .iter()
            .enumerate()
            .fold(Args::new(), |args, (i, (_, token))| args.named(format!("p{i}"), token.clone()));
        let reversed = values
            .iter()
            .enumerate()
            .rev()
            .fold(Args::new(), |args, (i, (_, token))| args.named(format!("p{i}"), token.clone()));

        prop_assert_eq!(signature.encode(&in_order).unwrap(), signature.encode(&reversed).unwrap());
    }

    #[test]
    fn static_indexed_fields_survive_a_log(from in address_token(), amount in uint_token(), memo in ".{0,20}") {
        let event = Event::new(
            "Deposit",
            [("from", ParamType::Address), ("amount", ParamType::Uint(256)), ("memo", ParamType::String)],
            ["from", "amount", "memo"],
            false,
        )
        .unwrap();

        let filter = event
            .filter(&Args::positional([from.clone(), amount.clone(), Token::String(memo.clone())]))
            .unwrap();
        let topics: Vec<H256> = filter
            .topics()
            .iter()
            .map(|alternatives| alternatives.as_ref().unwrap()[0])
            .collect();

        let decoded = event.decode(&LogEntry { topics, data: vec![] }).unwrap();
        prop_assert_eq!(decoded.get("from"), Some(&LogValue::Token(from)));
        prop_assert_eq!(decoded.get("amount"), Some(&LogValue::Token(amount)));
        let hashed = matches!(decoded.get("memo"), Some(LogValue::Hashed(_)));
        prop_assert!(hashed);
    }
}
