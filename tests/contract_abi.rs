use ethers::types::{Address, H256, U256};
use serde_json::{json, Value};
use sol_interface::codec;
use sol_interface::{
    AbiError, Args, BindingError, ContractAbi, ContractError, Either, FilterArg, LogEntry, LogValue, ParamType,
    Returned, StateMutability, Token, ValidationError,
};

fn erc20_abi() -> Value {
    json!([
        {
            "type": "constructor",
            "inputs": [
                {"name": "name_", "type": "string", "internalType": "string"},
                {"name": "symbol_", "type": "string", "internalType": "string"}
            ],
            "stateMutability": "nonpayable"
        },
        {
            "type": "function",
            "name": "balanceOf",
            "inputs": [{"name": "account", "type": "address"}],
            "outputs": [{"name": "", "type": "uint256"}],
            "stateMutability": "view"
        },
        {
            "type": "function",
            "name": "transfer",
            "inputs": [{"name": "to", "type": "address"}, {"name": "value", "type": "uint256"}],
            "outputs": [{"name": "", "type": "bool"}],
            "stateMutability": "nonpayable"
        },
        {
            "type": "event",
            "name": "Transfer",
            "anonymous": false,
            "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]
        },
        {
            "type": "event",
            "name": "Memo",
            "anonymous": false,
            "inputs": [
                {"name": "tag", "type": "string", "indexed": true},
                {"name": "body", "type": "string", "indexed": false}
            ]
        },
        {
            "type": "error",
            "name": "ERC20InsufficientBalance",
            "inputs": [
                {"name": "sender", "type": "address"},
                {"name": "balance", "type": "uint256"},
                {"name": "needed", "type": "uint256"}
            ]
        },
        {"type": "receive", "stateMutability": "payable"}
    ])
}

fn erc20() -> ContractAbi {
    ContractAbi::from_value(erc20_abi()).unwrap()
}

#[test]
fn assembles_every_entity() {
    let abi = erc20();
    assert_eq!(abi.constructor().inputs().len(), 2);
    assert!(!abi.constructor().payable());
    assert!(abi.receive().unwrap().payable);
    assert!(abi.fallback().is_none());

    assert_eq!(abi.methods().names().collect::<Vec<_>>(), ["balanceOf", "transfer"]);
    assert_eq!(abi.events().names().collect::<Vec<_>>(), ["Transfer", "Memo"]);
    assert_eq!(abi.errors().names().collect::<Vec<_>>(), ["Panic", "Error", "ERC20InsufficientBalance"]);

    let balance_of = abi.method("balanceOf").unwrap();
    assert_eq!(balance_of.mutability(), StateMutability::View);
    assert!(!balance_of.mutating());
    assert!(abi.method("transfer").unwrap().mutating());
}

#[test]
fn from_json_matches_from_value() {
    let from_json = ContractAbi::from_json(&erc20_abi().to_string()).unwrap();
    let from_value = erc20();
    assert_eq!(from_json.methods(), from_value.methods());
    assert_eq!(from_json.events(), from_value.events());
    assert_eq!(from_json.errors(), from_value.errors());
}

#[test]
fn transfer_call_and_result() {
    let abi = erc20();
    let transfer = abi.method("transfer").unwrap();
    assert_eq!(hex::encode(transfer.selector()), "a9059cbb");

    let to = Address::repeat_byte(0x11);
    let call = transfer
        .call(&Args::new().named("to", Token::Address(to)).named("value", Token::Uint(U256::exp10(18))))
        .unwrap();
    assert_eq!(abi.method_by_selector(call.data_bytes()).unwrap().name(), "transfer");

    let returned = transfer.decode_output(&codec::encode_tuple(&[Token::Bool(true)])).unwrap();
    assert_eq!(returned, Returned::Single(Token::Bool(true)));
}

#[test]
fn call_argument_errors() {
    let abi = erc20();
    let transfer = abi.method("transfer").unwrap();

    let err = transfer.call(&Args::new().named("to", Token::Address(Address::zero()))).unwrap_err();
    assert!(matches!(err, AbiError::Binding(BindingError::Missing(ref name)) if name == "value"));

    let err = transfer
        .call(
            &Args::new()
                .arg(Token::Address(Address::zero()))
                .named("to", Token::Address(Address::zero()))
                .named("value", Token::Uint(U256::one())),
        )
        .unwrap_err();
    assert!(matches!(err, AbiError::Binding(BindingError::MultipleValues(ref name)) if name == "to"));

    let err = transfer
        .call(&Args::positional([Token::Bool(true), Token::Uint(U256::one())]))
        .unwrap_err();
    assert!(matches!(err, AbiError::Binding(BindingError::TypeMismatch { ref expected, .. }) if expected == "address"));
}

#[test]
fn constructor_deploy_data() {
    let abi = erc20();
    let call = abi
        .constructor()
        .call(&Args::positional([Token::String("Token".into()), Token::String("TKN".into())]))
        .unwrap();
    let bytecode = [0x60, 0x80, 0x60, 0x40];
    let deploy = call.deploy_data(&bytecode);
    assert_eq!(&deploy[..4], &bytecode);
    assert_eq!(&deploy[4..], call.input_bytes());
}

#[test]
fn transfer_filter_with_alternatives() {
    let abi = erc20();
    let transfer = abi.event("Transfer").unwrap();
    let a = Address::repeat_byte(0xa);
    let b = Address::repeat_byte(0xb);

    let args = Args::<FilterArg>::new().named("to", Either::new([Token::Address(a), Token::Address(b)]));
    let filter = transfer.filter(&args).unwrap();

    let topic = |addr: Address| H256::from(addr);
    assert_eq!(
        filter.topics(),
        &[Some(vec![transfer.topic_signature()]), None, Some(vec![topic(a), topic(b)])]
    );
    assert_eq!(
        format!("{:?}", transfer.topic_signature()),
        "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
    );
}

#[test]
fn filter_rejects_data_fields_and_empty_alternatives() {
    let abi = erc20();
    let transfer = abi.event("Transfer").unwrap();

    let err = transfer
        .filter(&Args::new().named("value", Token::Uint(U256::one())))
        .unwrap_err();
    assert!(matches!(err, AbiError::Binding(BindingError::UnexpectedNamed(ref name)) if name == "value"));

    let err = transfer.filter(&Args::new().named("from", Either::new([]))).unwrap_err();
    assert!(matches!(err, AbiError::Binding(BindingError::EmptyEither(ref name)) if name == "from"));
}

#[test]
fn decodes_transfer_log() {
    let abi = erc20();
    let transfer = abi.event("Transfer").unwrap();
    let from = Address::repeat_byte(1);
    let to = Address::repeat_byte(2);

    let log = LogEntry {
        topics: vec![transfer.topic_signature(), H256::from(from), H256::from(to)],
        data: codec::encode_tuple(&[Token::Uint(U256::from(42))]),
    };
    let values = transfer.decode(&log).unwrap();
    assert_eq!(values.names().collect::<Vec<_>>(), ["from", "to", "value"]);
    assert_eq!(values.get("value").and_then(LogValue::as_token), Some(&Token::Uint(U256::from(42))));

    let short = LogEntry { topics: vec![transfer.topic_signature(), H256::from(from)], data: log.data.clone() };
    assert!(matches!(
        transfer.decode(&short),
        Err(AbiError::TopicCountMismatch { expected: 3, got: 2 })
    ));
}

#[test]
fn indexed_string_comes_back_hashed() {
    let abi = erc20();
    let memo = abi.event("Memo").unwrap();
    let tag_hash = H256::from(codec::keccak256("greeting"));

    let filter = memo.filter(&Args::new().arg(Token::String("greeting".into()))).unwrap();
    assert_eq!(filter.topics()[1], Some(vec![tag_hash]));

    let log = LogEntry {
        topics: vec![memo.topic_signature(), tag_hash],
        data: codec::encode_tuple(&[Token::String("hello".into())]),
    };
    let values = memo.decode(&log).unwrap();
    assert_eq!(values.get("tag"), Some(&LogValue::Hashed(tag_hash)));
    assert_eq!(values.get("body"), Some(&LogValue::Token(Token::String("hello".into()))));
}

#[test]
fn resolves_declared_error() {
    let abi = erc20();
    let declared = abi.error("ERC20InsufficientBalance").unwrap();
    let payload = declared
        .encode(&Args::positional([
            Token::Address(Address::repeat_byte(7)),
            Token::Uint(U256::from(1)),
            Token::Uint(U256::from(100)),
        ]))
        .unwrap();

    let (error, fields) = abi.resolve_error(&payload).unwrap();
    assert_eq!(error.name(), "ERC20InsufficientBalance");
    assert_eq!(fields.get("needed"), Some(&Token::Uint(U256::from(100))));
}

#[test]
fn resolves_require_message() {
    let abi = erc20();
    // revert("insufficient allowance")
    let payload = hex::decode(concat!(
        "08c379a0",
        "0000000000000000000000000000000000000000000000000000000000000020",
        "0000000000000000000000000000000000000000000000000000000000000016",
        "696e73756666696369656e7420616c6c6f77616e636500000000000000000000"
    ))
    .unwrap();
    let (error, fields) = abi.resolve_error(&payload).unwrap();
    assert_eq!(error, &ContractError::legacy());
    assert_eq!(fields.get("message"), Some(&Token::String("insufficient allowance".into())));
}

#[test]
fn unknown_and_truncated_revert_data() {
    let abi = erc20();
    assert!(matches!(abi.resolve_error(&[]), Err(AbiError::RevertDataTooShort(0))));
    assert!(matches!(
        abi.resolve_error(&hex::decode("deadbeef").unwrap()),
        Err(AbiError::UnknownError { selector: [0xde, 0xad, 0xbe, 0xef] })
    ));
    // known selector, body cut short
    assert!(matches!(abi.resolve_error(&hex::decode("08c379a000").unwrap()), Err(AbiError::Decode(_))));
}

#[test]
fn event_indexed_caps_from_json() {
    let inputs: Vec<Value> = (0..4)
        .map(|i| json!({"name": format!("f{i}"), "type": "uint256", "indexed": true}))
        .collect();

    let err = ContractAbi::from_value(json!([
        {"type": "event", "name": "Crowded", "anonymous": false, "inputs": inputs.clone()}
    ]))
    .unwrap_err();
    assert!(matches!(err, AbiError::Validation(ValidationError::TooManyIndexed { count: 4, max: 3, .. })));

    let abi = ContractAbi::from_value(json!([
        {"type": "event", "name": "Crowded", "anonymous": true, "inputs": inputs}
    ]))
    .unwrap();
    let event = abi.event("Crowded").unwrap();
    assert!(event.anonymous());
    assert_eq!(event.signature().indexed_count(), 4);
}

#[test]
fn constructor_declaration_rules() {
    let err = ContractAbi::from_value(json!([
        {"type": "constructor", "name": "init", "inputs": [], "stateMutability": "nonpayable"}
    ]))
    .unwrap_err();
    assert!(matches!(err, AbiError::Validation(ValidationError::ForbiddenField { kind: "constructor", .. })));

    let err = ContractAbi::from_value(json!([
        {"type": "constructor", "inputs": [], "stateMutability": "view"}
    ]))
    .unwrap_err();
    assert!(matches!(err, AbiError::Validation(ValidationError::DisallowedMutability { .. })));
}

#[test]
fn tuple_parameters_use_components() {
    let abi = ContractAbi::from_value(json!([
        {
            "type": "function",
            "name": "submit",
            "inputs": [{
                "name": "order",
                "type": "tuple",
                "components": [
                    {"name": "maker", "type": "address"},
                    {"name": "amounts", "type": "uint256[]"}
                ]
            }],
            "outputs": [],
            "stateMutability": "nonpayable"
        }
    ]))
    .unwrap();
    let submit = abi.method("submit").unwrap();
    assert_eq!(submit.canonical_signature(), "submit((address,uint256[]))");
    assert_eq!(
        submit.inputs().params()[0].kind,
        ParamType::Tuple(vec![ParamType::Address, ParamType::Array(Box::new(ParamType::Uint(256)))])
    );
}

#[test]
fn malformed_type_widths_are_rejected() {
    for kind in ["uint7", "uint0", "int300", "bytes33"] {
        let err = ContractAbi::from_value(json!([
            {"type": "function", "name": "f", "inputs": [{"name": "x", "type": kind}],
             "outputs": [], "stateMutability": "nonpayable"}
        ]))
        .unwrap_err();
        assert!(
            matches!(err, AbiError::Validation(ValidationError::UnknownType(ref k)) if k == kind),
            "{kind} should be rejected"
        );
    }
}

#[test]
fn out_of_range_argument_is_a_binding_error() {
    let abi = ContractAbi::from_value(json!([
        {"type": "function", "name": "setLevel", "inputs": [{"name": "level", "type": "uint8"}],
         "outputs": [], "stateMutability": "nonpayable"}
    ]))
    .unwrap();
    let set_level = abi.method("setLevel").unwrap();
    let err = set_level.call(&Args::positional([Token::Uint(U256::from(300))])).unwrap_err();
    assert!(matches!(
        err,
        AbiError::Binding(BindingError::TypeMismatch { ref name, ref expected }) if name == "level" && expected == "uint8"
    ));
    assert!(set_level.call(&Args::positional([Token::Uint(U256::from(255))])).is_ok());
}
