mod audio;
mod llm;
