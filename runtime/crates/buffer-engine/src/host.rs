//! QuickJS side of the buffer operations.

use buffer_core::{BufferError, Host, SourceValue};
use rquickjs::convert::Coerced;
use rquickjs::function::{Constructor, Rest, This};
use rquickjs::{Ctx, Error, FromJs, IntoJs, Object, Result, Symbol, TypedArray, Value};

use crate::errors;

/// A QuickJS context seen through the [`Host`] interface.
///
/// `prototype` is `Buffer.prototype`; instances created without one are plain
/// `Uint8Array`s. `uint8_array` is the constructor captured when `Buffer` was
/// built, used for `ArrayBuffer` views.
#[derive(Clone)]
pub struct QuickJsHost<'js> {
    ctx: Ctx<'js>,
    prototype: Option<Object<'js>>,
    uint8_array: Option<Constructor<'js>>,
}

impl<'js> QuickJsHost<'js> {
    pub fn new(ctx: Ctx<'js>, prototype: Option<Object<'js>>) -> Self {
        Self {
            ctx,
            prototype,
            uint8_array: None,
        }
    }

    /// Host over the frozen `{ prototype, Uint8Array }` record built by the
    /// `Buffer` shim.
    pub fn from_realm(ctx: Ctx<'js>, realm: &Object<'js>) -> Result<Self> {
        Ok(Self {
            prototype: Some(realm.get("prototype")?),
            uint8_array: Some(realm.get("Uint8Array")?),
            ctx,
        })
    }

    pub fn ctx(&self) -> &Ctx<'js> {
        &self.ctx
    }

    fn adopt(&self, view: &Object<'js>) -> Result<()> {
        if let Some(prototype) = &self.prototype {
            view.set_prototype(Some(prototype))?;
        }
        Ok(())
    }
}

impl<'js> Host for QuickJsHost<'js> {
    type Value = Value<'js>;
    type Instance = Object<'js>;
    type Error = Error;

    fn classify(&self, value: &Value<'js>) -> Result<SourceValue<Value<'js>>> {
        if value.is_undefined() || value.is_null() {
            return Ok(SourceValue::Absent);
        }
        if let Some(text) = value.as_string() {
            return Ok(SourceValue::String(text.to_string()?));
        }
        if let Some(number) = value.as_number() {
            return Ok(SourceValue::Number(number));
        }
        let Some(object) = value.as_object() else {
            return Ok(SourceValue::Other);
        };
        if object.as_array_buffer().is_some() {
            return Ok(SourceValue::ArrayBuffer);
        }
        if let Some(view) = object.as_typed_array::<u8>() {
            let bytes = view.as_bytes().map(<[u8]>::to_vec).unwrap_or_default();
            return Ok(SourceValue::ByteSequence(bytes));
        }
        Ok(SourceValue::Object(value.clone()))
    }

    fn describe(&self, value: &Value<'js>) -> String {
        if value.is_undefined() {
            "undefined".to_string()
        } else if value.is_null() {
            "null".to_string()
        } else if let Some(b) = value.as_bool() {
            format!("type boolean ({})", b)
        } else if let Some(n) = value.as_number() {
            format!("type number ({})", n)
        } else if let Some(s) = value.as_string() {
            format!("type string ('{}')", s.to_string().unwrap_or_default())
        } else if value.is_function() {
            "function".to_string()
        } else if let Some(object) = value.as_object() {
            let name = object
                .get::<_, Object<'js>>("constructor")
                .and_then(|ctor| ctor.get::<_, String>("name"))
                .unwrap_or_else(|_| "Object".to_string());
            format!("an instance of {}", name)
        } else {
            format!("{:?}", value.type_of())
        }
    }

    fn view_array_buffer(&self, args: &[Value<'js>]) -> Result<Object<'js>> {
        let Some(uint8_array) = &self.uint8_array else {
            return Err(Error::new_from_js("ArrayBuffer", "Buffer"));
        };
        let view: Object<'js> = uint8_array.construct((Rest(args.to_vec()),))?;
        self.adopt(&view)?;
        Ok(view)
    }

    fn array_buffer_bytes(&self, value: &Value<'js>) -> Result<Vec<u8>> {
        Ok(value
            .as_object()
            .and_then(|object| object.as_array_buffer())
            .and_then(|buffer| buffer.as_bytes())
            .map(<[u8]>::to_vec)
            .unwrap_or_default())
    }

    fn wrap_bytes(&self, bytes: Vec<u8>) -> Result<Object<'js>> {
        let view = TypedArray::<u8>::new(self.ctx.clone(), bytes)?;
        let view = Object::from_js(&self.ctx, view.into_js(&self.ctx)?)?;
        self.adopt(&view)?;
        Ok(view)
    }

    fn value_of(&self, object: &Value<'js>) -> Result<Option<Value<'js>>> {
        let Some(target) = object.as_object() else {
            return Ok(None);
        };
        let method: Value<'js> = target.get("valueOf")?;
        let Some(method) = method.as_function() else {
            return Ok(None);
        };
        let result: Value<'js> = method.call((This(object.clone()),))?;
        Ok(if result == *object { None } else { Some(result) })
    }

    fn to_primitive(&self, object: &Value<'js>, hint: &str) -> Result<Option<Value<'js>>> {
        let Some(target) = object.as_object() else {
            return Ok(None);
        };
        let method: Value<'js> = target.get(Symbol::to_primitive(self.ctx.clone()))?;
        let Some(method) = method.as_function() else {
            return Ok(None);
        };
        let result: Value<'js> = method.call((This(object.clone()), hint))?;
        Ok(Some(result))
    }

    fn length(&self, object: &Value<'js>) -> Result<Option<f64>> {
        let Some(target) = object.as_object() else {
            return Ok(None);
        };
        let length: Value<'js> = target.get("length")?;
        if length.is_undefined() {
            return Ok(None);
        }
        self.to_number(&length).map(Some)
    }

    fn element(&self, object: &Value<'js>, index: usize) -> Result<Option<f64>> {
        let Some(target) = object.as_object() else {
            return Ok(None);
        };
        let item: Value<'js> = match u32::try_from(index) {
            Ok(index) => target.get(index)?,
            Err(_) => target.get(index.to_string())?,
        };
        if item.is_undefined() {
            return Ok(None);
        }
        self.to_number(&item).map(Some)
    }

    fn to_number(&self, value: &Value<'js>) -> Result<f64> {
        Ok(Coerced::<f64>::from_js(&self.ctx, value.clone())?.0)
    }

    fn to_text(&self, value: &Value<'js>) -> Result<String> {
        Ok(Coerced::<String>::from_js(&self.ctx, value.clone())?.0)
    }

    fn is_absent(&self, value: &Value<'js>) -> bool {
        value.is_undefined() || value.is_null()
    }

    fn raise(&self, error: BufferError) -> Error {
        errors::throw(&self.ctx, error)
    }
}
