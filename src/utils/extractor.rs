//! 路径参数提取器
//!
//! 解析失败时直接返回统一格式的 400 响应，而不是 actix 默认的纯文本错误。

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn parse_path_i64(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(name).unwrap_or_default();
    match raw.parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => {
            let message = format!("路径参数 {name} 无效: '{raw}'");
            let response = HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
            Err(actix_web::error::InternalError::from_response(message, response).into())
        }
    }
}

macro_rules! define_safe_i64_extractors {
    ($($name:ident => $param:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name(pub i64);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                    ready(parse_path_i64(req, $param).map($name))
                }
            }
        )*
    };
}

define_safe_i64_extractors! {
    SafeIDI64 => "id",
    SafeClassIdI64 => "class_id",
}
