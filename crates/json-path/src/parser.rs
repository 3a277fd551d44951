use serde_json::Value;

use crate::{
    ast::is_name_char, CompareOp, FilterExpr, JsonPointer, Operand, ParseJsonPathError,
    PointerSegment, Segment,
};

type Result<T> = std::result::Result<T, ParseJsonPathError>;

/// Upper bound on `!`, `(`, `&&` and `||` tokens in one path. The filter tree
/// is recursive, so its depth has to stay bounded.
pub const MAX_FILTER_OPERATORS: usize = 256;

pub(crate) struct JsonPathParser<'a> {
    input: &'a [u8],
    pos: usize,
    operators: usize,
}

impl<'a> JsonPathParser<'a> {
    #[inline]
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            operators: 0,
        }
    }

    #[inline]
    fn error(&self) -> ParseJsonPathError {
        ParseJsonPathError { offset: self.pos }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    fn starts_with(&self, needle: &[u8]) -> bool {
        self.input[self.pos..].starts_with(needle)
    }

    fn eat(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: u8) -> Result<()> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn count_operator(&mut self) -> Result<()> {
        self.operators += 1;
        if self.operators > MAX_FILTER_OPERATORS {
            return Err(self.error());
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    pub(crate) fn parse(mut self) -> Result<Vec<Segment>> {
        self.expect(b'$')?;

        let mut segments = Vec::new();
        while self.pos < self.input.len() {
            segments.push(self.parse_segment()?);
        }
        Ok(segments)
    }

    fn parse_segment(&mut self) -> Result<Segment> {
        match self.peek() {
            Some(b'.') => {
                self.pos += 1;
                if self.eat(b'*') {
                    Ok(Segment::Wildcard)
                } else {
                    // `..` (recursive descent) falls through here and fails on the empty name
                    self.parse_name().map(Segment::Child)
                }
            }
            Some(b'[') => {
                self.pos += 1;
                self.skip_whitespace();
                let segment = self.parse_bracket()?;
                self.skip_whitespace();
                self.expect(b']')?;
                Ok(segment)
            }
            _ => Err(self.error()),
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.pos;
        while self.peek().map(is_name_char).unwrap_or_default() {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error());
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .map(ToString::to_string)
            .map_err(|_| ParseJsonPathError { offset: start })
    }

    fn parse_bracket(&mut self) -> Result<Segment> {
        match self.peek() {
            Some(b'\'' | b'"') => self.parse_quoted().map(Segment::Child),
            Some(b'*') => {
                self.pos += 1;
                Ok(Segment::Wildcard)
            }
            Some(b'?') => {
                self.pos += 1;
                self.skip_whitespace();
                self.parse_or().map(Segment::Filter)
            }
            Some(b'0'..=b'9') => self.parse_index().map(Segment::Index),
            _ => Err(self.error()),
        }
    }

    fn parse_index(&mut self) -> Result<usize> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|digits| digits.parse::<usize>().ok())
            .ok_or(ParseJsonPathError { offset: start })
    }

    fn parse_quoted(&mut self) -> Result<String> {
        let start = self.pos;
        let quote = self.input[self.pos];
        self.pos += 1;

        let mut s = Vec::new();
        loop {
            match memchr::memchr2(quote, b'\\', &self.input[self.pos..]) {
                Some(idx) => {
                    s.extend_from_slice(&self.input[self.pos..self.pos + idx]);
                    self.pos += idx;
                    if self.input[self.pos] == quote {
                        self.pos += 1;
                        break;
                    }

                    self.pos += 1;
                    match self.peek() {
                        Some(ch @ (b'\\' | b'\'' | b'"' | b'/')) => s.push(ch),
                        Some(b'n') => s.push(b'\n'),
                        Some(b't') => s.push(b'\t'),
                        _ => return Err(self.error()),
                    }
                    self.pos += 1;
                }
                None => {
                    self.pos = self.input.len();
                    return Err(self.error());
                }
            }
        }

        String::from_utf8(s).map_err(|_| ParseJsonPathError { offset: start })
    }

    fn parse_or(&mut self) -> Result<FilterExpr> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if !self.starts_with(b"||") {
                return Ok(left);
            }
            self.count_operator()?;
            self.pos += 2;
            let right = self.parse_and()?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
    }

    fn parse_and(&mut self) -> Result<FilterExpr> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            if !self.starts_with(b"&&") {
                return Ok(left);
            }
            self.count_operator()?;
            self.pos += 2;
            let right = self.parse_unary()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> Result<FilterExpr> {
        self.skip_whitespace();
        if self.peek() == Some(b'!') {
            self.count_operator()?;
            self.pos += 1;
            return Ok(FilterExpr::Not(Box::new(self.parse_unary()?)));
        }

        if self.peek() == Some(b'(') {
            self.count_operator()?;
            self.pos += 1;
            let expr = self.parse_or()?;
            self.skip_whitespace();
            self.expect(b')')?;
            return Ok(expr);
        }

        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<FilterExpr> {
        let start = self.pos;
        let left = self.parse_operand()?;
        self.skip_whitespace();

        match self.parse_compare_op() {
            Some(op) => {
                self.skip_whitespace();
                let right = self.parse_operand()?;
                Ok(FilterExpr::Compare { left, op, right })
            }
            None => match left {
                Operand::Current(pointer) => Ok(FilterExpr::Exists(pointer)),
                Operand::Literal(_) => Err(ParseJsonPathError { offset: start }),
            },
        }
    }

    fn parse_compare_op(&mut self) -> Option<CompareOp> {
        const OPS: &[(&[u8], CompareOp)] = &[
            (b"==", CompareOp::Eq),
            (b"!=", CompareOp::Ne),
            (b"<=", CompareOp::Le),
            (b">=", CompareOp::Ge),
            (b"<", CompareOp::Lt),
            (b">", CompareOp::Gt),
        ];

        OPS.iter().find_map(|(token, op)| {
            if self.starts_with(token) {
                self.pos += token.len();
                Some(*op)
            } else {
                None
            }
        })
    }

    fn parse_operand(&mut self) -> Result<Operand> {
        match self.peek() {
            Some(b'@') => {
                self.pos += 1;
                self.parse_relative_path().map(Operand::Current)
            }
            Some(b'\'' | b'"') => self
                .parse_quoted()
                .map(|s| Operand::Literal(Value::String(s))),
            Some(b'-' | b'0'..=b'9') => self.parse_number().map(Operand::Literal),
            _ => self.parse_keyword().map(Operand::Literal),
        }
    }

    fn parse_relative_path(&mut self) -> Result<JsonPointer> {
        let mut pointer = JsonPointer::root();
        loop {
            match self.peek() {
                Some(b'.') => {
                    self.pos += 1;
                    pointer.push(PointerSegment::Key(self.parse_name()?));
                }
                Some(b'[') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    let segment = match self.peek() {
                        Some(b'\'' | b'"') => PointerSegment::Key(self.parse_quoted()?),
                        Some(b'0'..=b'9') => PointerSegment::Index(self.parse_index()?),
                        _ => return Err(self.error()),
                    };
                    self.skip_whitespace();
                    self.expect(b']')?;
                    pointer.push(segment);
                }
                _ => return Ok(pointer),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9')
        ) {
            self.pos += 1;
        }
        match serde_json::from_slice::<Value>(&self.input[start..self.pos]) {
            Ok(value @ Value::Number(_)) => Ok(value),
            _ => Err(ParseJsonPathError { offset: start }),
        }
    }

    fn parse_keyword(&mut self) -> Result<Value> {
        let keywords: [(&[u8], Value); 3] = [
            (&b"true"[..], Value::Bool(true)),
            (&b"false"[..], Value::Bool(false)),
            (&b"null"[..], Value::Null),
        ];

        for (keyword, value) in keywords {
            let end = self.pos + keyword.len();
            if self.starts_with(keyword)
                && !self.input.get(end).copied().map(is_name_char).unwrap_or_default()
            {
                self.pos = end;
                return Ok(value);
            }
        }
        Err(self.error())
    }
}

pub(crate) fn parse_json_path(input: &str) -> Result<Vec<Segment>> {
    JsonPathParser::new(input).parse()
}
