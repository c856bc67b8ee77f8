use std::io::{Cursor, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::error::Error;
use super::Result;


/// シリアライズした 1 メッセージの最大バイナリ長です。IPv4 のデータ部最大長である 65,507 を表します。
pub const MAX_MESSAGE_SIZE: usize = 65507;

/// OSC メッセージの 1 引数を表す列挙型。それぞれの値はワイヤー上で 1 文字のタイプタグに対応付けられています。
/// `True`/`False`/`Nil` はタグのみで値を表現するためペイロードを持ちません。
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
  /// タグ `i`。ビッグエンディアンの 4 バイト 2 の補数表現。
  Int32(i32),
  /// タグ `h`。ビッグエンディアンの 8 バイト 2 の補数表現。
  Int64(i64),
  /// タグ `f`。ビッグエンディアンの IEEE-754 単精度。
  Float32(f32),
  /// タグ `d`。ビッグエンディアンの IEEE-754 倍精度。
  Double(f64),
  /// タグ `s`。NUL 終端 + 4 バイト境界へのパディング付き UTF-8 文字列。
  String(String),
  /// タグ `b`。4 バイトの長さプレフィクス付きバイナリ。パディングはデータ長のみから算出される。
  Blob(Vec<u8>),
  /// タグ `T`。ペイロードなし。
  True,
  /// タグ `F`。ペイロードなし。
  False,
  /// タグ `N`。ペイロードなし。
  Nil,
}

impl Argument {
  /// この引数をワイヤー上で識別するタイプタグ文字を参照します。
  pub fn type_tag(&self) -> char {
    match self {
      Argument::Int32(_) => 'i',
      Argument::Int64(_) => 'h',
      Argument::Float32(_) => 'f',
      Argument::Double(_) => 'd',
      Argument::String(_) => 's',
      Argument::Blob(_) => 'b',
      Argument::True => 'T',
      Argument::False => 'F',
      Argument::Nil => 'N',
    }
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    match self {
      Argument::Int32(value) => write_i32(buf, *value),
      Argument::Int64(value) => write_i64(buf, *value),
      Argument::Float32(value) => write_f32(buf, *value),
      Argument::Double(value) => write_f64(buf, *value),
      Argument::String(value) => write_str(buf, value),
      Argument::Blob(value) => write_bin(buf, value),
      Argument::True | Argument::False | Argument::Nil => Ok(()),
    }
  }

  fn read_from<R: Read>(tag: char, buf: &mut R) -> Result<Argument> {
    match tag {
      'i' => Ok(Argument::Int32(read_i32(buf)?)),
      'h' => Ok(Argument::Int64(read_i64(buf)?)),
      'f' => Ok(Argument::Float32(read_f32(buf)?)),
      'd' => Ok(Argument::Double(read_f64(buf)?)),
      's' => Ok(Argument::String(read_str(buf)?)),
      'b' => Ok(Argument::Blob(read_bin(buf)?)),
      'T' => Ok(Argument::True),
      'F' => Ok(Argument::False),
      'N' => Ok(Argument::Nil),
      // 未知のタグを読み飛ばすと以降の読み込み位置がずれるため即エラーとする
      unexpected => Err(Error::UnknownTypeTag { tag: unexpected }),
    }
  }
}

impl From<bool> for Argument {
  fn from(value: bool) -> Argument {
    if value {
      Argument::True
    } else {
      Argument::False
    }
  }
}

impl From<i32> for Argument {
  fn from(value: i32) -> Argument {
    Argument::Int32(value)
  }
}

impl From<i64> for Argument {
  fn from(value: i64) -> Argument {
    Argument::Int64(value)
  }
}

impl From<f32> for Argument {
  fn from(value: f32) -> Argument {
    Argument::Float32(value)
  }
}

impl From<f64> for Argument {
  fn from(value: f64) -> Argument {
    Argument::Double(value)
  }
}

impl From<&str> for Argument {
  fn from(value: &str) -> Argument {
    Argument::String(value.to_string())
  }
}

impl From<String> for Argument {
  fn from(value: String) -> Argument {
    Argument::String(value)
  }
}

impl From<Vec<u8>> for Argument {
  fn from(value: Vec<u8>) -> Argument {
    Argument::Blob(value)
  }
}

impl From<&[u8]> for Argument {
  fn from(value: &[u8]) -> Argument {
    Argument::Blob(value.to_vec())
  }
}

impl From<()> for Argument {
  fn from(_: ()) -> Argument {
    Argument::Nil
  }
}

/// アドレスと順序付きの引数リストからなる 1 つの OSC メッセージ。
///
/// `append` で引数を追加した後に `marshal` でワイヤーフォーマットへ変換します。逆方向は `decode` が
/// 1 メッセージ分のバイト列からアドレスと引数リストを復元します。正しく構築されたメッセージに対して
/// `decode(marshal(msg))` は元のメッセージと等価な値を返します。
///
/// `append` に渡す値と OSC 型の対応付けは `Argument` への `From` 変換で決まります。対応していない型は
/// コンパイル時に弾かれるため、実行時に引数が黙って破棄されることはありません。精度を明示したい場合は
/// `Argument::Float32` や `Argument::Double` を直接渡します。
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
  /// このメッセージの宛先を示すアドレス。慣習的に `/` で始まるが、この層では検証しない。
  addr: String,
  /// 追加された順序を保持する引数リスト。
  args: Vec<Argument>,
}

impl Message {
  /// 指定されたアドレスを持つ空のメッセージを構築します。
  pub fn new<A: Into<String>>(addr: A) -> Message {
    Message { addr: addr.into(), args: Vec::new() }
  }

  /// このメッセージのアドレスを参照します。
  pub fn addr(&self) -> &str {
    &self.addr
  }

  /// このメッセージの引数リストを追加順に参照します。
  pub fn args(&self) -> &[Argument] {
    &self.args
  }

  /// このメッセージの末尾に引数を追加します。`Argument` に変換可能な値であればネイティブの値を直接
  /// 渡すことができます。メソッドチェーンで連続して追加できるよう自身への参照を返します。
  ///
  /// ```
  /// use oscmsg::msg::Message;
  ///
  /// let mut msg = Message::new("/chatbox/input");
  /// msg.append("hello world").append(true);
  /// ```
  pub fn append<A: Into<Argument>>(&mut self, value: A) -> &mut Message {
    self.args.push(value.into());
    self
  }

  /// このメッセージをワイヤーフォーマットに変換したバイト列を返します。結果はアドレスと引数リストのみ
  /// から決まり、何度呼び出しても同じバイト列が得られます。外側の長さプレフィクスやフレーミングは付与
  /// しません。
  pub fn marshal(&self) -> Vec<u8> {
    let mut buffer = Vec::new();
    if self.write_to(&mut buffer).is_err() {
      // Vec<u8> に対する Write は失敗しない
      debug_assert!(false, "write to Vec<u8> must not fail");
    }
    buffer
  }

  /// このメッセージをワイヤーフォーマットで指定された出力先に書き込みます。レイアウトは
  /// `[アドレス][パディング][","+タグ列][パディング][引数ペイロード...]` です。
  pub fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    write_str(buf, &self.addr)?;
    let mut type_tag = String::from(",");
    let mut payload = Vec::new();
    for arg in &self.args {
      type_tag.push(arg.type_tag());
      arg.write_to(&mut payload)?;
    }
    write_str(buf, &type_tag)?;
    buf.write_all(&payload)?;
    log::trace!("marshaled message: addr={}, args={}", self.addr, self.args.len());
    Ok(())
  }

  /// 1 メッセージ分のバイト列からメッセージを復元します。トランスポートのフレーミングは呼び出し側で
  /// 除去されている前提です。
  ///
  /// タイプタグ文字列が `,` で始まらない場合は `MalformedTypeTag`、未知のタグ文字が含まれる場合は
  /// `UnknownTypeTag`、バッファが途中で尽きた場合は `BufferUnsatisfied` を返します。復元は原子的で、
  /// 部分的な結果を返すことはありません。
  pub fn decode(buffer: &[u8]) -> Result<Message> {
    let mut cursor = Cursor::new(buffer);
    Message::read_from(&mut cursor)
  }

  /// 指定された入力からメッセージを 1 つ読み込んで復元します。
  pub fn read_from<R: Read>(buf: &mut R) -> Result<Message> {
    let addr = read_str(buf)?;
    let tags = read_str(buf)?;
    if !tags.starts_with(',') {
      return Err(Error::MalformedTypeTag { tags });
    }
    let mut args = Vec::with_capacity(tags.len() - 1);
    for tag in tags.chars().skip(1) {
      args.push(Argument::read_from(tag, buf)?);
    }
    log::trace!("decoded message: addr={}, args={}", addr, args.len());
    Ok(Message { addr, args })
  }
}

/// 指定された長さのフィールドを 4 バイト境界に揃えるためのパディング長を算出します。OSC の仕様では
/// フィールドの後ろに必ず 1～4 バイトのゼロを置くため、長さが既に 4 の倍数の場合でも 0 ではなく 4 を
/// 返します。文字列フィールドでは NUL 終端がパディングの先頭 1 バイトを兼ねます。
pub(crate) fn pad_count(length: usize) -> usize {
  4 - (length % 4) % 4
}

const PADDING: [u8; 4] = [0u8; 4];

#[inline]
fn write_i32<W: Write>(buf: &mut W, value: i32) -> Result<()> {
  buf.write_i32::<BigEndian>(value).map_err(Error::from)
}

#[inline]
fn read_i32<R: Read>(buf: &mut R) -> Result<i32> {
  buf.read_i32::<BigEndian>().map_err(Error::from)
}

#[inline]
fn write_i64<W: Write>(buf: &mut W, value: i64) -> Result<()> {
  buf.write_i64::<BigEndian>(value).map_err(Error::from)
}

#[inline]
fn read_i64<R: Read>(buf: &mut R) -> Result<i64> {
  buf.read_i64::<BigEndian>().map_err(Error::from)
}

#[inline]
fn write_f32<W: Write>(buf: &mut W, value: f32) -> Result<()> {
  buf.write_f32::<BigEndian>(value).map_err(Error::from)
}

#[inline]
fn read_f32<R: Read>(buf: &mut R) -> Result<f32> {
  buf.read_f32::<BigEndian>().map_err(Error::from)
}

#[inline]
fn write_f64<W: Write>(buf: &mut W, value: f64) -> Result<()> {
  buf.write_f64::<BigEndian>(value).map_err(Error::from)
}

#[inline]
fn read_f64<R: Read>(buf: &mut R) -> Result<f64> {
  buf.read_f64::<BigEndian>().map_err(Error::from)
}

#[inline]
fn write_str<W: Write>(buf: &mut W, value: &str) -> Result<()> {
  buf.write_all(value.as_bytes())?;
  buf.write_all(&PADDING[..pad_count(value.len())]).map_err(Error::from)
}

#[inline]
fn read_str<R: Read>(buf: &mut R) -> Result<String> {
  let mut bytes = Vec::new();
  loop {
    match buf.read_u8()? {
      0u8 => break,
      b => bytes.push(b),
    }
  }
  // NUL 終端はパディングの先頭 1 バイト分として数える
  let mut padding = [0u8; 3];
  buf.read_exact(&mut padding[..pad_count(bytes.len()) - 1])?;
  String::from_utf8(bytes).map_err(Error::from)
}

#[inline]
fn write_bin<W: Write>(buf: &mut W, value: &[u8]) -> Result<()> {
  write_i32(buf, value.len() as i32)?;
  buf.write_all(value)?;
  buf.write_all(&PADDING[..pad_count(value.len())]).map_err(Error::from)
}

#[inline]
fn read_bin<R: Read>(buf: &mut R) -> Result<Vec<u8>> {
  let length = read_i32(buf)?;
  if length < 0 {
    return Err(Error::IllegalBlobLength { length });
  }
  let length = length as usize;
  let mut buffer = vec![0u8; length + pad_count(length)];
  buf.read_exact(&mut buffer)?;
  buffer.truncate(length);
  Ok(buffer)
}
