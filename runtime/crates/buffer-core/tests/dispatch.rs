//! Buffer construction, allocation and instance operations against an
//! in-memory host.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use buffer_core::{BufferApi, BufferConfig, BufferError, CodecRegistry, Encoded, Host, SourceValue};

#[derive(Clone, Debug)]
enum Js {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    ArrayBuffer(Rc<RefCell<Vec<u8>>>),
    Bytes(Vec<u8>),
    Object(Rc<Obj>),
}

#[derive(Debug, Default)]
struct Obj {
    props: HashMap<String, Js>,
    value_of: ValueOf,
    to_primitive: Option<Js>,
}

#[derive(Debug, Default)]
enum ValueOf {
    #[default]
    Missing,
    ReturnsSelf,
    Returns(Js),
    Throws(String),
}

#[derive(Debug)]
enum Instance {
    Owned(Vec<u8>),
    View(Rc<RefCell<Vec<u8>>>),
}

impl Instance {
    fn bytes(&self) -> Vec<u8> {
        match self {
            Instance::Owned(bytes) => bytes.clone(),
            Instance::View(storage) => storage.borrow().clone(),
        }
    }

    fn value(&self) -> Js {
        Js::Bytes(self.bytes())
    }
}

#[derive(Debug, PartialEq)]
enum MockError {
    Buffer(BufferError),
    Thrown(String),
}

struct MockHost;

impl Host for MockHost {
    type Value = Js;
    type Instance = Instance;
    type Error = MockError;

    fn classify(&self, value: &Js) -> Result<SourceValue<Js>, MockError> {
        Ok(match value {
            Js::Undefined | Js::Null => SourceValue::Absent,
            Js::Bool(_) => SourceValue::Other,
            Js::Number(n) => SourceValue::Number(*n),
            Js::Str(s) => SourceValue::String(s.clone()),
            Js::ArrayBuffer(_) => SourceValue::ArrayBuffer,
            Js::Bytes(bytes) => SourceValue::ByteSequence(bytes.clone()),
            Js::Object(_) => SourceValue::Object(value.clone()),
        })
    }

    fn describe(&self, value: &Js) -> String {
        match value {
            Js::Undefined => "undefined".to_string(),
            Js::Null => "null".to_string(),
            Js::Bool(b) => format!("type boolean ({})", b),
            Js::Number(n) => format!("type number ({})", n),
            Js::Str(s) => format!("type string ('{}')", s),
            _ => "an instance of Object".to_string(),
        }
    }

    fn view_array_buffer(&self, args: &[Js]) -> Result<Instance, MockError> {
        match args.first() {
            Some(Js::ArrayBuffer(storage)) => Ok(Instance::View(storage.clone())),
            _ => Err(MockError::Thrown("not an ArrayBuffer".into())),
        }
    }

    fn array_buffer_bytes(&self, value: &Js) -> Result<Vec<u8>, MockError> {
        match value {
            Js::ArrayBuffer(storage) => Ok(storage.borrow().clone()),
            _ => Err(MockError::Thrown("not an ArrayBuffer".into())),
        }
    }

    fn wrap_bytes(&self, bytes: Vec<u8>) -> Result<Instance, MockError> {
        Ok(Instance::Owned(bytes))
    }

    fn value_of(&self, object: &Js) -> Result<Option<Js>, MockError> {
        let Js::Object(obj) = object else {
            return Ok(None);
        };
        match &obj.value_of {
            ValueOf::Missing | ValueOf::ReturnsSelf => Ok(None),
            ValueOf::Returns(value) => Ok(Some(value.clone())),
            ValueOf::Throws(message) => Err(MockError::Thrown(message.clone())),
        }
    }

    fn to_primitive(&self, object: &Js, hint: &str) -> Result<Option<Js>, MockError> {
        assert_eq!(hint, "string");
        let Js::Object(obj) = object else {
            return Ok(None);
        };
        Ok(obj.to_primitive.clone())
    }

    fn length(&self, object: &Js) -> Result<Option<f64>, MockError> {
        let Js::Object(obj) = object else {
            return Ok(None);
        };
        match obj.props.get("length") {
            None | Some(Js::Undefined) => Ok(None),
            Some(value) => self.to_number(value).map(Some),
        }
    }

    fn element(&self, object: &Js, index: usize) -> Result<Option<f64>, MockError> {
        let Js::Object(obj) = object else {
            return Ok(None);
        };
        match obj.props.get(&index.to_string()) {
            None | Some(Js::Undefined) => Ok(None),
            Some(value) => self.to_number(value).map(Some),
        }
    }

    fn to_number(&self, value: &Js) -> Result<f64, MockError> {
        Ok(match value {
            Js::Null => 0.0,
            Js::Bool(b) => f64::from(u8::from(*b)),
            Js::Number(n) => *n,
            Js::Str(s) => s.trim().parse().unwrap_or(f64::NAN),
            _ => f64::NAN,
        })
    }

    fn to_text(&self, value: &Js) -> Result<String, MockError> {
        Ok(match value {
            Js::Undefined => "undefined".to_string(),
            Js::Null => "null".to_string(),
            Js::Bool(b) => b.to_string(),
            Js::Number(n) => n.to_string(),
            Js::Str(s) => s.clone(),
            Js::Bytes(bytes) => bytes.iter().map(u8::to_string).collect::<Vec<_>>().join(","),
            _ => "[object Object]".to_string(),
        })
    }

    fn is_absent(&self, value: &Js) -> bool {
        matches!(value, Js::Undefined | Js::Null)
    }

    fn raise(&self, error: BufferError) -> MockError {
        MockError::Buffer(error)
    }
}

fn api() -> BufferApi<MockHost> {
    BufferApi::with_defaults(MockHost)
}

fn s(text: &str) -> Js {
    Js::Str(text.to_string())
}

fn n(value: f64) -> Js {
    Js::Number(value)
}

fn object(obj: Obj) -> Js {
    Js::Object(Rc::new(obj))
}

fn array_like(length: f64, items: &[(usize, Js)]) -> Js {
    let mut props = HashMap::new();
    props.insert("length".to_string(), n(length));
    for (index, value) in items {
        props.insert(index.to_string(), value.clone());
    }
    object(Obj {
        props,
        ..Obj::default()
    })
}

fn code(result: Result<Instance, MockError>) -> &'static str {
    match result {
        Err(MockError::Buffer(err)) => err.code(),
        other => panic!("expected a buffer error, got {:?}", other),
    }
}

// ========================================================================
// Buffer.from
// ========================================================================

#[test]
fn test_from_string_defaults_to_utf8() {
    let buf = api().from(&[s("héllo")]).unwrap();
    assert_eq!(buf.bytes(), "héllo".as_bytes());
}

#[test]
fn test_from_hex() {
    let buf = api().from(&[s("68656c6c6f"), s("hex")]).unwrap();
    assert_eq!(buf.bytes(), b"hello");
}

#[test]
fn test_from_hex_invalid_keeps_prefix() {
    let buf = api().from(&[s("6869zz6c"), s("hex")]).unwrap();
    assert_eq!(buf.bytes(), b"hi");
}

#[test]
fn test_from_base64_and_url() {
    assert_eq!(api().from(&[s("aGVsbG8="), s("base64")]).unwrap().bytes(), b"hello");
    assert_eq!(api().from(&[s("aGVsbG8"), s("base64Url")]).unwrap().bytes(), b"hello");
}

#[test]
fn test_from_string_absent_encoding_is_utf8() {
    assert_eq!(api().from(&[s("ab"), Js::Undefined]).unwrap().bytes(), b"ab");
    assert_eq!(api().from(&[s("ab"), Js::Null]).unwrap().bytes(), b"ab");
}

#[test]
fn test_from_string_unknown_encoding() {
    let result = api().from(&[s("ab"), s("latin9")]);
    assert!(matches!(
        result,
        Err(MockError::Buffer(BufferError::UnknownEncoding(ref name))) if name == "latin9"
    ));
}

#[test]
fn test_from_array_like_truncates_elements() {
    let source = array_like(3.0, &[(0, n(10.0)), (1, n(300.0)), (2, Js::Undefined)]);
    assert_eq!(api().from(&[source]).unwrap().bytes(), vec![10, 44, 0]);
}

#[test]
fn test_from_array_like_missing_and_odd_elements() {
    let source = array_like(4.0, &[(0, n(-1.0)), (1, s("7")), (3, s("x"))]);
    assert_eq!(api().from(&[source]).unwrap().bytes(), vec![255, 7, 0, 0]);
}

#[test]
fn test_from_array_like_bad_lengths() {
    assert!(api().from(&[array_like(f64::NAN, &[])]).unwrap().bytes().is_empty());
    assert!(api().from(&[array_like(-3.0, &[])]).unwrap().bytes().is_empty());
    assert_eq!(
        code(api().from(&[array_like(f64::INFINITY, &[])])),
        "ERR_INVALID_ARG_TYPE"
    );
}

#[test]
fn test_from_byte_sequence_copies() {
    let buf = api().from(&[Js::Bytes(vec![1, 2, 3])]).unwrap();
    assert!(matches!(buf, Instance::Owned(ref bytes) if bytes == &[1, 2, 3]));
}

#[test]
fn test_from_array_buffer_aliases_storage() {
    let storage = Rc::new(RefCell::new(vec![1, 2, 3]));
    let buf = api().from(&[Js::ArrayBuffer(storage.clone())]).unwrap();
    storage.borrow_mut()[0] = 9;
    assert_eq!(buf.bytes(), vec![9, 2, 3]);
}

#[test]
fn test_from_value_of_recurses() {
    let boxed = object(Obj {
        value_of: ValueOf::Returns(s("boxed")),
        ..Obj::default()
    });
    assert_eq!(api().from(&[boxed]).unwrap().bytes(), b"boxed");
}

#[test]
fn test_from_value_of_keeps_encoding_argument() {
    let boxed = object(Obj {
        value_of: ValueOf::Returns(s("6869")),
        ..Obj::default()
    });
    assert_eq!(api().from(&[boxed, s("hex")]).unwrap().bytes(), b"hi");
}

#[test]
fn test_from_to_primitive_when_value_of_is_identity() {
    let source = object(Obj {
        value_of: ValueOf::ReturnsSelf,
        to_primitive: Some(s("prim")),
        ..Obj::default()
    });
    assert_eq!(api().from(&[source]).unwrap().bytes(), b"prim");
}

#[test]
fn test_from_value_of_wins_over_array_like() {
    let mut props = HashMap::new();
    props.insert("length".to_string(), n(2.0));
    let source = object(Obj {
        props,
        value_of: ValueOf::Returns(s("v")),
        ..Obj::default()
    });
    assert_eq!(api().from(&[source]).unwrap().bytes(), b"v");
}

#[test]
fn test_from_value_of_error_propagates() {
    let source = object(Obj {
        value_of: ValueOf::Throws("boom".into()),
        ..Obj::default()
    });
    assert!(matches!(
        api().from(&[source]),
        Err(MockError::Thrown(ref message)) if message == "boom"
    ));
}

#[test]
fn test_from_value_of_number_is_rejected() {
    let date_like = object(Obj {
        value_of: ValueOf::Returns(n(1700000000000.0)),
        ..Obj::default()
    });
    assert_eq!(code(api().from(&[date_like])), "ERR_INVALID_ARG_TYPE");
}

#[test]
fn test_from_coercion_depth_is_bounded() {
    let mut source = s("never reached");
    for _ in 0..40 {
        source = object(Obj {
            value_of: ValueOf::Returns(source),
            ..Obj::default()
        });
    }
    assert_eq!(code(api().from(&[source])), "ERR_INVALID_ARG_TYPE");

    let config = BufferConfig {
        max_coercion_depth: 64,
        ..BufferConfig::default()
    };
    let deep = BufferApi::new(MockHost, CodecRegistry::standard(), config);
    let mut source = s("reached");
    for _ in 0..40 {
        source = object(Obj {
            value_of: ValueOf::Returns(source),
            ..Obj::default()
        });
    }
    assert_eq!(deep.from(&[source]).unwrap().bytes(), b"reached");
}

#[test]
fn test_from_rejects_unsupported_sources() {
    for source in [n(5.0), Js::Bool(true), Js::Null, Js::Undefined, object(Obj::default())] {
        assert_eq!(code(api().from(&[source])), "ERR_INVALID_ARG_TYPE");
    }
}

#[test]
fn test_from_without_arguments() {
    match api().from(&[]) {
        Err(MockError::Buffer(BufferError::InvalidArgType(message))) => {
            assert!(message.ends_with("Received undefined"), "{}", message);
            assert!(message.contains("Array-like Object"), "{}", message);
        }
        other => panic!("unexpected {:?}", other),
    }
}

// ========================================================================
// Constructor
// ========================================================================

#[test]
fn test_construct_rejects_numbers() {
    assert_eq!(code(api().construct(&[n(10.0)])), "ERR_METHOD_NOT_IMPLEMENTED");
    assert_eq!(code(api().construct(&[n(1.5)])), "ERR_METHOD_NOT_IMPLEMENTED");
}

#[test]
fn test_construct_delegates_to_from() {
    let buf = api().construct(&[s("6869"), s("hex")]).unwrap();
    assert_eq!(buf.bytes(), b"hi");
    assert_eq!(code(api().construct(&[])), "ERR_INVALID_ARG_TYPE");
}

// ========================================================================
// Buffer.alloc
// ========================================================================

#[test]
fn test_alloc_zeroed() {
    assert!(api().alloc(&[n(0.0)]).unwrap().bytes().is_empty());
    assert_eq!(api().alloc(&[n(5.0)]).unwrap().bytes(), vec![0; 5]);
    assert_eq!(api().alloc(&[n(2.0), Js::Undefined]).unwrap().bytes(), vec![0; 2]);
}

#[test]
fn test_alloc_string_fill() {
    let buf = api().alloc(&[n(5.0), s("ab"), s("utf8")]).unwrap();
    assert_eq!(buf.bytes(), b"ababa");
    let buf = api().alloc(&[n(3.0), s("ab"), Js::Undefined]).unwrap();
    assert_eq!(buf.bytes(), b"aba");
    let buf = api().alloc(&[n(5.0), s("aGk="), s("base64")]).unwrap();
    assert_eq!(buf.bytes(), b"hihih");
}

#[test]
fn test_alloc_numeric_fill() {
    assert_eq!(api().alloc(&[n(3.0), n(255.0)]).unwrap().bytes(), vec![255; 3]);
    assert_eq!(api().alloc(&[n(2.0), n(258.0)]).unwrap().bytes(), vec![2; 2]);
    assert_eq!(api().alloc(&[n(2.0), n(f64::NAN)]).unwrap().bytes(), vec![0; 2]);
    assert_eq!(api().alloc(&[n(2.0), n(f64::INFINITY)]).unwrap().bytes(), vec![0; 2]);
    assert_eq!(api().alloc(&[n(2.0), Js::Bool(true)]).unwrap().bytes(), vec![1; 2]);
    assert_eq!(api().alloc(&[n(2.0), Js::Null]).unwrap().bytes(), vec![0; 2]);
}

#[test]
fn test_alloc_invalid_size() {
    assert_eq!(code(api().alloc(&[])), "ERR_INVALID_ARG_TYPE");
    assert_eq!(code(api().alloc(&[s("5")])), "ERR_INVALID_ARG_TYPE");
    assert_eq!(code(api().alloc(&[n(-1.0)])), "ERR_INVALID_ARG_TYPE");
    assert_eq!(code(api().alloc(&[n(f64::INFINITY)])), "ERR_INVALID_ARG_TYPE");
}

#[test]
fn test_alloc_unknown_fill_encoding() {
    assert_eq!(
        code(api().alloc(&[n(4.0), s("ab"), s("ucs2")])),
        "ERR_UNKNOWN_ENCODING"
    );
}

#[test]
fn test_alloc_non_string_fill_encoding_means_utf8() {
    assert_eq!(api().alloc(&[n(4.0), s("ab"), n(5.0)]).unwrap().bytes(), b"abab");
    assert_eq!(api().alloc(&[n(4.0), s("ab"), Js::Null]).unwrap().bytes(), b"abab");
    assert_eq!(api().alloc(&[n(2.0), s("6869"), Js::Bool(true)]).unwrap().bytes(), b"68");
}

fn limited(max_length: usize) -> BufferApi<MockHost> {
    let config = BufferConfig {
        max_length,
        ..BufferConfig::default()
    };
    BufferApi::new(MockHost, CodecRegistry::standard(), config)
}

#[test]
fn test_alloc_rejects_sizes_above_max_length() {
    assert_eq!(code(api().alloc(&[n(1e15), n(1.0)])), "ERR_OUT_OF_RANGE");
    assert_eq!(code(limited(8).alloc(&[n(9.0)])), "ERR_OUT_OF_RANGE");
    assert_eq!(limited(8).alloc(&[n(8.0), s("a")]).unwrap().bytes(), vec![b'a'; 8]);
}

#[test]
fn test_from_array_like_rejects_lengths_above_max_length() {
    assert_eq!(code(api().from(&[array_like(1e15, &[])])), "ERR_OUT_OF_RANGE");
    let source = array_like(5.0, &[(0, n(1.0))]);
    assert_eq!(code(limited(4).from(&[source.clone()])), "ERR_OUT_OF_RANGE");
    assert_eq!(limited(5).from(&[source]).unwrap().bytes(), vec![1, 0, 0, 0, 0]);
}

// ========================================================================
// toString / equals
// ========================================================================

#[test]
fn test_to_string() {
    let api = api();
    let buf = api.from(&[s("hello")]).unwrap().value();
    assert_eq!(api.to_string(&buf, None).unwrap(), "hello");
    assert_eq!(api.to_string(&buf, Some(&Js::Undefined)).unwrap(), "hello");
    assert_eq!(api.to_string(&buf, Some(&s("hex"))).unwrap(), "68656c6c6f");
    assert_eq!(api.to_string(&buf, Some(&s("base64Url"))).unwrap(), "aGVsbG8");
}

#[test]
fn test_to_string_unknown_encoding() {
    let api = api();
    let buf = api.from(&[s("hello")]).unwrap().value();
    assert_eq!(
        api.to_string(&buf, Some(&s("HEX"))),
        Err(MockError::Buffer(BufferError::UnknownEncoding("HEX".into())))
    );
}

#[test]
fn test_to_string_on_non_view_receiver() {
    assert_eq!(api().to_string(&s("plain"), Some(&s("hex"))).unwrap(), "706c61696e");
}

#[test]
fn test_equals() {
    let api = api();
    let a = api.from(&[s("abc")]).unwrap().value();
    let b = api.from(&[s("abc")]).unwrap().value();
    let c = api.from(&[s("abd")]).unwrap().value();
    let d = api.from(&[s("ab")]).unwrap().value();
    assert_eq!(api.equals(&a, &b), Ok(true));
    assert_eq!(api.equals(&a, &c), Ok(false));
    assert_eq!(api.equals(&a, &d), Ok(false));
}

#[test]
fn test_equals_rejects_non_views() {
    let api = api();
    let a = api.from(&[s("abc")]).unwrap().value();
    for other in [s("abc"), Js::ArrayBuffer(Rc::new(RefCell::new(b"abc".to_vec()))), array_like(0.0, &[])] {
        assert!(matches!(
            api.equals(&a, &other),
            Err(MockError::Buffer(BufferError::InvalidArgType(_)))
        ));
    }
}

// ========================================================================
// Embedder helpers
// ========================================================================

#[test]
fn test_decode_bytes() {
    let api = api();
    assert_eq!(api.decode_bytes(&s("6869"), Some(&s("hex"))).unwrap(), b"hi");
    assert_eq!(api.decode_bytes(&Js::Bytes(vec![7]), None).unwrap(), vec![7]);
    let storage = Rc::new(RefCell::new(vec![4, 5]));
    assert_eq!(api.decode_bytes(&Js::ArrayBuffer(storage), None).unwrap(), vec![4, 5]);
    match api.decode_bytes(&n(1.0), None) {
        Err(MockError::Buffer(err)) => assert!(err.to_string().starts_with("The \"data\" argument")),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_encode_bytes() {
    let api = api();
    assert!(matches!(
        api.encode_bytes(b"hi".to_vec(), Some(&s("hex"))),
        Ok(Encoded::Text(ref text)) if text == "6869"
    ));
    assert!(matches!(
        api.encode_bytes(b"hi".to_vec(), None),
        Ok(Encoded::Buffer(Instance::Owned(ref bytes))) if bytes == b"hi"
    ));
    assert!(matches!(
        api.encode_bytes(b"hi".to_vec(), Some(&s("nope"))),
        Ok(Encoded::Buffer(_))
    ));
}
