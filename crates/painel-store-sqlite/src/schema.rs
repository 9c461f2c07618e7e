//! SQL schema for the painel SQLite store.
//!
//! Executed on every connection open and stamps `user_version` = 1.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Dimensions. `chave` holds the folded lookup key; its UNIQUE constraint is
-- what keeps case/accent variants from becoming separate rows.

CREATE TABLE IF NOT EXISTS unidade_da_federacao (
    id_uf  INTEGER PRIMARY KEY,
    sigla  TEXT NOT NULL,
    chave  TEXT NOT NULL UNIQUE,
    nome   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS regiao_administrativa (
    id_ra  INTEGER PRIMARY KEY,
    nome   TEXT NOT NULL,
    chave  TEXT NOT NULL UNIQUE,
    id_uf  INTEGER REFERENCES unidade_da_federacao(id_uf)
);

CREATE TABLE IF NOT EXISTS tipo_equipamento (
    id_tipo_equipamento        INTEGER PRIMARY KEY,
    nome                       TEXT NOT NULL,
    chave                      TEXT NOT NULL UNIQUE,
    descricao                  TEXT,
    quantidade_publico         INTEGER,
    quantidade_privado         INTEGER,
    quantidade_funcionando_sus INTEGER,
    quantidade_parado_sus      INTEGER
);

CREATE TABLE IF NOT EXISTS categoria_profissional (
    id_categoria INTEGER PRIMARY KEY,
    nome         TEXT NOT NULL,
    chave        TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS tipo_exame (
    id_tipo_exame INTEGER PRIMARY KEY,
    nome          TEXT NOT NULL,
    chave         TEXT NOT NULL UNIQUE,
    descricao     TEXT
);

CREATE TABLE IF NOT EXISTS pagina_portal (
    id_pagina INTEGER PRIMARY KEY,
    url       TEXT NOT NULL,
    chave     TEXT NOT NULL UNIQUE,
    nome      TEXT,
    sistema   TEXT
);

-- Facts. Only espera_exame declares a natural key; the others are
-- append-only and accumulate a row per load.

CREATE TABLE IF NOT EXISTS espera_exame (
    id_espera                INTEGER PRIMARY KEY,
    id_uf                    INTEGER NOT NULL REFERENCES unidade_da_federacao(id_uf),
    id_tipo_exame            INTEGER NOT NULL REFERENCES tipo_exame(id_tipo_exame),
    ano                      INTEGER NOT NULL,
    qtd_tempo_espera_0_10    INTEGER NOT NULL,
    qtd_tempo_espera_11_20   INTEGER NOT NULL,
    qtd_tempo_espera_21_30   INTEGER NOT NULL,
    qtd_tempo_espera_30_mais INTEGER NOT NULL,
    UNIQUE (id_uf, id_tipo_exame, ano)
);

CREATE TABLE IF NOT EXISTS equipamento_registrado (
    id_equipamento_registrado INTEGER PRIMARY KEY,
    id_tipo_equipamento       INTEGER NOT NULL REFERENCES tipo_equipamento(id_tipo_equipamento),
    id_ra                     INTEGER NOT NULL REFERENCES regiao_administrativa(id_ra),
    ano                       INTEGER NOT NULL,
    quantidade                INTEGER NOT NULL CHECK (quantidade >= 0)
);

CREATE TABLE IF NOT EXISTS exame_realizado (
    id_exame_realizado INTEGER PRIMARY KEY,
    id_tipo_exame      INTEGER NOT NULL REFERENCES tipo_exame(id_tipo_exame),
    id_uf              INTEGER NOT NULL REFERENCES unidade_da_federacao(id_uf),
    ano                INTEGER NOT NULL,
    mes                INTEGER NOT NULL CHECK (mes BETWEEN 1 AND 12),
    quantidade         INTEGER NOT NULL CHECK (quantidade >= 0)
);

CREATE TABLE IF NOT EXISTS profissional_registrado (
    id_profissional_registrado INTEGER PRIMARY KEY,
    id_categoria               INTEGER NOT NULL REFERENCES categoria_profissional(id_categoria),
    id_uf                      INTEGER NOT NULL REFERENCES unidade_da_federacao(id_uf),
    ano                        INTEGER NOT NULL,
    mes                        INTEGER NOT NULL CHECK (mes BETWEEN 1 AND 12),
    quantidade                 INTEGER NOT NULL CHECK (quantidade >= 0)
);

CREATE TABLE IF NOT EXISTS populacao (
    id_populacao              INTEGER PRIMARY KEY,
    id_ra                     INTEGER NOT NULL REFERENCES regiao_administrativa(id_ra),
    ano                       INTEGER NOT NULL,
    populacao_total           INTEGER NOT NULL,
    populacao_plano_saude     INTEGER NOT NULL,
    populacao_sem_plano_saude INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS metrica_wave (
    id_metrica      INTEGER PRIMARY KEY,
    id_pagina       INTEGER NOT NULL REFERENCES pagina_portal(id_pagina),
    data_coleta     TEXT NOT NULL,
    errors          INTEGER NOT NULL,
    contrast_errors INTEGER NOT NULL,
    alerts          INTEGER NOT NULL,
    aim_score       REAL
);

CREATE INDEX IF NOT EXISTS equipamento_ra_idx   ON equipamento_registrado(id_ra);
CREATE INDEX IF NOT EXISTS profissional_ano_idx ON profissional_registrado(ano, mes);
CREATE INDEX IF NOT EXISTS metrica_pagina_idx   ON metrica_wave(id_pagina);

PRAGMA user_version = 1;
";
