use thiserror::Error as ThisError;

#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum Error {
  #[error("should receive more data to restore the entire message")]
  BufferUnsatisfied,

  #[error("type-tag string doesn't begin with ',': {tags:?}")]
  MalformedTypeTag { tags: String },
  #[error("unknown type-tag character: {tag:?}")]
  UnknownTypeTag { tag: char },
  #[error("illegal UTF-8 sequence in string field: {message}")]
  IllegalStringEncoding { message: String },
  #[error("illegal blob length: {length}")]
  IllegalBlobLength { length: i32 },

  #[error("underlying I/O layer error: {message}")]
  Io {
    kind: std::io::ErrorKind,
    message: String, // TODO use of unstable library feature 'backtrace'
                     // TODO see issue #53487 <https://github.com/rust-lang/rust/issues/53487> for more information
                     // #[source]
                     // source: std::io::Error
                     // #[from]
                     // source: std::io::Error,
                     // backtrace: std::backtrace::Backtrace
  },
}

impl From<std::io::Error> for Error {
  fn from(err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
      Error::BufferUnsatisfied
    } else {
      Error::Io { kind: err.kind(), message: err.to_string() }
    }
  }
}

impl From<std::string::FromUtf8Error> for Error {
  fn from(err: std::string::FromUtf8Error) -> Error {
    Error::IllegalStringEncoding { message: err.to_string() }
  }
}
