//! The command facade: a drop-in wrapper over a redis-rs connection.
//!
//! [`TracedConnection`] owns a connection and a [`Telemetry`] handle and
//! exposes one method per store command. Every method is generated from the
//! single declarative table below: the method name, the wire tokens in wire
//! order, and which arguments stand in as the representative key and value
//! for length measurement. The same table produces [`OPERATIONS`], the
//! stable list of operation names the views are tagged with.
//!
//! Commands keep redis-rs conventions: arguments are `ToRedisArgs`, return
//! values are decoded through `FromRedisValue`, and errors are the
//! underlying `RedisError`, propagated verbatim.

use redis::{Cmd, ConnectionLike, FromRedisValue, RedisResult, ToRedisArgs, Value};
use tracing::debug;

use crate::intercept::invoke_traced;
use crate::lengths::{Measurable, Operand};
use crate::telemetry::Telemetry;

/// Instrumented wrapper for a synchronous redis-rs connection.
///
/// Behaves exactly like issuing the commands on the wrapped connection,
/// plus one span and one batch of metric recordings per call.
///
/// # Example
///
/// ```ignore
/// let client = redis::Client::open("redis://127.0.0.1/")?;
/// let conn = client.get_connection()?;
/// let mut conn = TracedConnection::new(conn, telemetry);
///
/// let _: () = conn.set("counter", "42")?;
/// let value: String = conn.get("counter")?;
/// ```
pub struct TracedConnection<C> {
    conn: C,
    telemetry: Telemetry,
}

impl<C: ConnectionLike> TracedConnection<C> {
    /// Wrap a connection with the given telemetry context.
    pub fn new(conn: C, telemetry: Telemetry) -> Self {
        debug!(db = conn.get_db(), "wrapping redis connection");
        Self { conn, telemetry }
    }

    /// Get a reference to the wrapped connection.
    pub fn inner(&self) -> &C {
        &self.conn
    }

    /// Get a mutable reference to the wrapped connection. Commands issued
    /// through it bypass instrumentation.
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    /// Consume the wrapper and return the wrapped connection.
    pub fn into_inner(self) -> C {
        self.conn
    }

    /// Issue a raw command, traced but with no key/value measurement.
    ///
    /// Escape hatch for commands the facade does not enumerate.
    pub fn req_command(&mut self, cmd: &Cmd) -> RedisResult<Value> {
        let Self { conn, telemetry } = self;
        invoke_traced(
            telemetry,
            "redisrs.Client.req_command",
            &Operand::None,
            &Operand::None,
            || conn.req_command(cmd),
        )
    }
}

/// Pick the operand for a key/value selector: either one of the method's
/// arguments, or `-` for commands with no natural key or value.
macro_rules! select_operand {
    (-) => {
        Operand::None
    };
    ($arg:ident) => {
        Measurable::operand(&$arg)
    };
}

/// Assemble a command from its wire tokens.
macro_rules! build_command {
    ($wire:expr) => {
        ::redis::cmd($wire)
    };
    ($wire:expr, $($token:expr),+) => {{
        let mut cmd = ::redis::cmd($wire);
        $(cmd.arg($token);)+
        cmd
    }};
}

/// The command table. Each entry is
/// `method(args) => [WIRE, tokens-in-wire-order], key: <arg|->, value: <arg|->;`
/// and expands to one facade method plus one `OPERATIONS` entry.
macro_rules! traced_commands {
    ($(
        $(#[$meta:meta])*
        $name:ident ( $($arg:ident : $gen:ident),* $(,)? )
            => [ $wire:expr $(, $token:expr)* $(,)? ],
            key: $key:tt, value: $value:tt;
    )*) => {
        impl<C: ConnectionLike> TracedConnection<C> {
        $(
            $(#[$meta])*
            pub fn $name<$($gen: ToRedisArgs + Measurable,)* RV: FromRedisValue>(
                &mut self,
                $($arg: $gen),*
            ) -> RedisResult<RV> {
                let key_operand = select_operand!($key);
                let value_operand = select_operand!($value);
                let Self { conn, telemetry } = self;
                invoke_traced(
                    telemetry,
                    concat!("redisrs.Client.", stringify!($name)),
                    &key_operand,
                    &value_operand,
                    move || build_command!($wire $(, $token)*).query(conn),
                )
            }
        )*
        }

        /// Every operation name exposed by the command facade, in table
        /// order. Part of the observability contract: dashboards key on
        /// these strings, so they are stable across versions.
        pub const OPERATIONS: &[&str] = &[
            $(concat!("redisrs.Client.", stringify!($name))),*
        ];
    };
}

traced_commands! {
    // --- Generic / keys ---

    /// Delete one or more keys.
    del(key: K) => ["DEL", key], key: key, value: -;
    exists(key: K) => ["EXISTS", key], key: key, value: -;
    expire(key: K, seconds: S) => ["EXPIRE", key, seconds], key: key, value: -;
    expire_at(key: K, ts: S) => ["EXPIREAT", key, ts], key: key, value: -;
    pexpire(key: K, ms: S) => ["PEXPIRE", key, ms], key: key, value: -;
    persist(key: K) => ["PERSIST", key], key: key, value: -;
    ttl(key: K) => ["TTL", key], key: key, value: -;
    pttl(key: K) => ["PTTL", key], key: key, value: -;
    rename(key: K, new_key: N) => ["RENAME", key, new_key], key: key, value: -;
    rename_nx(key: K, new_key: N) => ["RENAMENX", key, new_key], key: key, value: -;
    keys(pattern: K) => ["KEYS", pattern], key: pattern, value: -;
    key_type(key: K) => ["TYPE", key], key: key, value: -;
    unlink(key: K) => ["UNLINK", key], key: key, value: -;
    touch(key: K) => ["TOUCH", key], key: key, value: -;
    randomkey() => ["RANDOMKEY"], key: -, value: -;
    /// Incremental iteration; callers pass the cursor from the previous reply.
    scan(cursor: Cu) => ["SCAN", cursor], key: -, value: -;

    // --- Strings ---

    /// Append a value to a key.
    append(key: K, value: V) => ["APPEND", key, value], key: key, value: value;
    get(key: K) => ["GET", key], key: key, value: -;
    get_del(key: K) => ["GETDEL", key], key: key, value: -;
    set(key: K, value: V) => ["SET", key, value], key: key, value: value;
    /// `SETEX` takes the expiry before the payload on the wire.
    set_ex(key: K, value: V, seconds: S) => ["SETEX", key, seconds, value], key: key, value: value;
    pset_ex(key: K, value: V, milliseconds: S) => ["PSETEX", key, milliseconds, value], key: key, value: value;
    set_nx(key: K, value: V) => ["SETNX", key, value], key: key, value: value;
    /// Set multiple keys from `(key, value)` pairs.
    set_multiple(items: I) => ["MSET", items], key: items, value: -;
    mset_nx(items: I) => ["MSETNX", items], key: items, value: -;
    getset(key: K, value: V) => ["GETSET", key, value], key: key, value: value;
    mget(key: K) => ["MGET", key], key: key, value: -;
    getrange(key: K, from: F, to: T) => ["GETRANGE", key, from, to], key: key, value: -;
    setrange(key: K, offset: O, value: V) => ["SETRANGE", key, offset, value], key: key, value: value;
    strlen(key: K) => ["STRLEN", key], key: key, value: -;
    incr(key: K, delta: D) => ["INCRBY", key, delta], key: key, value: -;
    decr(key: K, delta: D) => ["DECRBY", key, delta], key: key, value: -;
    incrbyfloat(key: K, delta: D) => ["INCRBYFLOAT", key, delta], key: key, value: -;

    // --- Bits ---

    setbit(key: K, offset: O, value: V) => ["SETBIT", key, offset, value], key: key, value: -;
    getbit(key: K, offset: O) => ["GETBIT", key, offset], key: key, value: -;
    bitcount(key: K) => ["BITCOUNT", key], key: key, value: -;
    bit_and(dstkey: D, srckeys: S) => ["BITOP", "AND", dstkey, srckeys], key: srckeys, value: -;
    bit_or(dstkey: D, srckeys: S) => ["BITOP", "OR", dstkey, srckeys], key: srckeys, value: -;
    bit_xor(dstkey: D, srckeys: S) => ["BITOP", "XOR", dstkey, srckeys], key: srckeys, value: -;
    bit_not(dstkey: D, srckey: S) => ["BITOP", "NOT", dstkey, srckey], key: srckey, value: -;
    /// `ops` is the flat `GET`/`SET`/`INCRBY` subcommand sequence.
    bitfield(key: K, ops: O) => ["BITFIELD", key, ops], key: key, value: -;

    // --- Hashes ---

    hget(key: K, field: F) => ["HGET", key, field], key: key, value: -;
    hset(key: K, field: F, value: V) => ["HSET", key, field, value], key: key, value: value;
    hset_nx(key: K, field: F, value: V) => ["HSETNX", key, field, value], key: key, value: value;
    /// Set multiple hash fields from `(field, value)` pairs.
    hset_multiple(key: K, items: I) => ["HSET", key, items], key: key, value: items;
    hmget(key: K, fields: F) => ["HMGET", key, fields], key: key, value: -;
    hdel(key: K, field: F) => ["HDEL", key, field], key: key, value: -;
    hexists(key: K, field: F) => ["HEXISTS", key, field], key: key, value: -;
    hgetall(key: K) => ["HGETALL", key], key: key, value: -;
    hincr(key: K, field: F, delta: D) => ["HINCRBY", key, field, delta], key: key, value: -;
    hincrbyfloat(key: K, field: F, delta: D) => ["HINCRBYFLOAT", key, field, delta], key: key, value: -;
    hkeys(key: K) => ["HKEYS", key], key: key, value: -;
    hvals(key: K) => ["HVALS", key], key: key, value: -;
    hlen(key: K) => ["HLEN", key], key: key, value: -;
    hscan(key: K, cursor: Cu) => ["HSCAN", key, cursor], key: key, value: -;

    // --- Lists ---

    lpush(key: K, value: V) => ["LPUSH", key, value], key: key, value: value;
    lpush_exists(key: K, value: V) => ["LPUSHX", key, value], key: key, value: value;
    rpush(key: K, value: V) => ["RPUSH", key, value], key: key, value: value;
    rpush_exists(key: K, value: V) => ["RPUSHX", key, value], key: key, value: value;
    lpop(key: K) => ["LPOP", key], key: key, value: -;
    rpop(key: K) => ["RPOP", key], key: key, value: -;
    blpop(key: K, timeout: T) => ["BLPOP", key, timeout], key: key, value: -;
    brpop(key: K, timeout: T) => ["BRPOP", key, timeout], key: key, value: -;
    brpoplpush(srckey: S, dstkey: D, timeout: T)
        => ["BRPOPLPUSH", srckey, dstkey, timeout], key: srckey, value: -;
    lrange(key: K, start: S, stop: T) => ["LRANGE", key, start, stop], key: key, value: -;
    llen(key: K) => ["LLEN", key], key: key, value: -;
    lrem(key: K, count: N, value: V) => ["LREM", key, count, value], key: key, value: value;
    lset(key: K, index: N, value: V) => ["LSET", key, index, value], key: key, value: value;
    ltrim(key: K, start: S, stop: T) => ["LTRIM", key, start, stop], key: key, value: -;
    lindex(key: K, index: N) => ["LINDEX", key, index], key: key, value: -;
    linsert_before(key: K, pivot: P, value: V)
        => ["LINSERT", key, "BEFORE", pivot, value], key: key, value: value;
    linsert_after(key: K, pivot: P, value: V)
        => ["LINSERT", key, "AFTER", pivot, value], key: key, value: value;
    rpoplpush(key: K, dstkey: D) => ["RPOPLPUSH", key, dstkey], key: key, value: -;

    // --- Sets ---

    sadd(key: K, member: M) => ["SADD", key, member], key: key, value: member;
    srem(key: K, member: M) => ["SREM", key, member], key: key, value: member;
    sismember(key: K, member: M) => ["SISMEMBER", key, member], key: key, value: member;
    smembers(key: K) => ["SMEMBERS", key], key: key, value: -;
    scard(key: K) => ["SCARD", key], key: key, value: -;
    spop(key: K) => ["SPOP", key], key: key, value: -;
    srandmember(key: K) => ["SRANDMEMBER", key], key: key, value: -;
    sdiff(keys: K) => ["SDIFF", keys], key: keys, value: -;
    sdiffstore(dstkey: D, keys: K) => ["SDIFFSTORE", dstkey, keys], key: keys, value: -;
    sinter(keys: K) => ["SINTER", keys], key: keys, value: -;
    sinterstore(dstkey: D, keys: K) => ["SINTERSTORE", dstkey, keys], key: keys, value: -;
    sunion(keys: K) => ["SUNION", keys], key: keys, value: -;
    sunionstore(dstkey: D, keys: K) => ["SUNIONSTORE", dstkey, keys], key: keys, value: -;
    smove(srckey: S, dstkey: D, member: M)
        => ["SMOVE", srckey, dstkey, member], key: srckey, value: member;
    sscan(key: K, cursor: Cu) => ["SSCAN", key, cursor], key: key, value: -;

    // --- Sorted sets ---

    /// `ZADD` takes the score before the member on the wire.
    zadd(key: K, member: M, score: S) => ["ZADD", key, score, member], key: key, value: member;
    /// Add multiple members from `(score, member)` pairs.
    zadd_multiple(key: K, items: I) => ["ZADD", key, items], key: key, value: items;
    zincr(key: K, member: M, delta: D) => ["ZINCRBY", key, delta, member], key: key, value: member;
    zrem(key: K, members: M) => ["ZREM", key, members], key: key, value: members;
    zscore(key: K, member: M) => ["ZSCORE", key, member], key: key, value: member;
    zcard(key: K) => ["ZCARD", key], key: key, value: -;
    zcount(key: K, min: L, max: U) => ["ZCOUNT", key, min, max], key: key, value: -;
    zrange(key: K, start: S, stop: T) => ["ZRANGE", key, start, stop], key: key, value: -;
    zrevrange(key: K, start: S, stop: T) => ["ZREVRANGE", key, start, stop], key: key, value: -;
    zrangebyscore(key: K, min: L, max: U) => ["ZRANGEBYSCORE", key, min, max], key: key, value: -;
    zrevrangebyscore(key: K, max: U, min: L)
        => ["ZREVRANGEBYSCORE", key, max, min], key: key, value: -;
    zremrangebyrank(key: K, start: S, stop: T)
        => ["ZREMRANGEBYRANK", key, start, stop], key: key, value: -;
    zremrangebyscore(key: K, min: L, max: U)
        => ["ZREMRANGEBYSCORE", key, min, max], key: key, value: -;
    zrank(key: K, member: M) => ["ZRANK", key, member], key: key, value: member;
    zrevrank(key: K, member: M) => ["ZREVRANK", key, member], key: key, value: member;
    zpopmax(key: K, count: N) => ["ZPOPMAX", key, count], key: key, value: -;
    zpopmin(key: K, count: N) => ["ZPOPMIN", key, count], key: key, value: -;
    zscan(key: K, cursor: Cu) => ["ZSCAN", key, cursor], key: key, value: -;

    // --- HyperLogLog ---

    pfadd(key: K, element: E) => ["PFADD", key, element], key: key, value: element;
    pfcount(key: K) => ["PFCOUNT", key], key: key, value: -;
    pfmerge(dstkey: D, srckeys: S) => ["PFMERGE", dstkey, srckeys], key: dstkey, value: -;

    // --- Pub/Sub ---

    publish(channel: Ch, message: M) => ["PUBLISH", channel, message], key: -, value: message;

    // --- Connection / server ---

    ping() => ["PING"], key: -, value: -;
    echo(message: M) => ["ECHO", message], key: -, value: message;
    dbsize() => ["DBSIZE"], key: -, value: -;
    flushdb() => ["FLUSHDB"], key: -, value: -;
    flushall() => ["FLUSHALL"], key: -, value: -;
}
