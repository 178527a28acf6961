/// 业务错误码
///
/// 按模块分段：1xxx 请求，2xxx 认证授权，3xxx 班级，4xxx 测验，5xxx 作答，9xxx 服务端。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 请求
    BadRequest = 1000,
    ValidationFailed = 1001,

    // 认证授权
    Unauthorized = 2000,

    // 班级
    ClassNotFound = 3000,
    ClassPermissionDenied = 3001,

    // 测验
    QuizNotFound = 4000,
    QuizNotOwner = 4001,

    // 作答
    AttemptNotFound = 5000,
    AttemptNotOwned = 5001,
    AttemptLimitReached = 5002,
    QuizNotYetOpen = 5003,
    QuizClosed = 5004,
    AttemptAlreadySubmitted = 5005,
    AttemptExpired = 5006,
    EmptySubmission = 5007,
    AttemptNotSubmitted = 5008,

    InternalServerError = 9500,
}
