pub mod jwt;
pub mod multipart;
pub mod password;
pub mod s3;
pub mod storage;
pub mod validation;
