use rand;
use rand::prelude::StdRng;
use rand::{RngCore, SeedableRng};

/// 一様にランダムなテスト用の値を採集するための構造体。シードを指定することでランダムだが決定論的な値を生成する。
pub struct SampleValues {
  rng: Box<StdRng>,
}

impl SampleValues {
  /// シードを指定してサンプル値ジェネレータを初期化します。
  pub fn new(seed: u64) -> SampleValues {
    let mut s = [0u8; 32];
    for i in 0..8 {
      s[i] = ((seed >> (i * 8)) & 0xFF) as u8
    }
    SampleValues { rng: Box::new(rand::rngs::StdRng::from_seed(s)) }
  }

  pub fn next_bool(&mut self) -> bool {
    (self.rng.next_u32() & 0x01) != 0
  }

  pub fn next_i32(&mut self) -> i32 {
    self.rng.next_u32() as i32
  }

  pub fn next_i64(&mut self) -> i64 {
    self.rng.next_u64() as i64
  }

  pub fn next_f32(&mut self) -> f32 {
    self.rng.next_u32() as f32 / 65536f32
  }

  pub fn next_f64(&mut self) -> f64 {
    self.rng.next_u64() as f64 / 65536f64
  }

  pub fn next_bytes(&mut self, length: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(length);
    for _ in 0..length {
      bytes.push(0u8)
    }
    self.rng.fill_bytes(&mut bytes);
    bytes
  }

  pub fn next_string(&mut self, length: usize) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789/_";
    let mut s = String::with_capacity(length);
    for _ in 0..length {
      s.push(CHARS[(self.rng.next_u32() as usize) % CHARS.len()] as char)
    }
    s
  }
}

#[test]
fn test_sample_values() {
  // シードによって乱数が変動する
  let seeds = [0u64, 1, 2, 3, 4, 5, 100, 200];
  for i in 1..seeds.len() {
    let mut s1 = SampleValues::new(seeds[i - 1]);
    let mut s2 = SampleValues::new(seeds[i]);
    assert_ne!(s1.next_i32(), s2.next_i32());
    assert_ne!(s1.next_i64(), s2.next_i64());
    assert_ne!(s1.next_bytes(256), s2.next_bytes(256));
  }

  // 指定した長さのバイト配列と文字列を作成している
  let mut sample = SampleValues::new(783629830u64);
  assert_eq!(sample.next_bytes(1024).len(), 1024);
  assert_eq!(sample.next_string(32).len(), 32);
}
